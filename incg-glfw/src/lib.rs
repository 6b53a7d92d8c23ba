//! [GLFW](https://crates.io/crates/glfw) backend for incg.
//!
//! [`GlfwSurface`] opens a window with an OpenGL core context, loads the OpenGL functions and
//! acquires the [`GL33`] backend for the current thread.

#![deny(missing_docs)]

use glfw::{self, Context as _, Glfw, InitError, Window, WindowEvent, WindowMode};
use incg::context::GraphicsContext;
pub use incg_gl::gl33::StateQueryError;
use incg_gl::GL33;
use incg_windowing::{CursorMode, WindowDim, WindowOpt};
use std::{error, fmt, os::raw::c_void, sync::mpsc::Receiver};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// The window or its OpenGL context could not be created.
  WindowCreationFailed,

  /// Fullscreen was requested but no monitor is connected.
  NoPrimaryMonitor,

  /// The primary monitor has no video mode.
  NoVideoMode,

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for GlfwSurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreationFailed => f.write_str("failed to create window"),
      GlfwSurfaceError::NoPrimaryMonitor => f.write_str("no primary monitor"),
      GlfwSurfaceError::NoVideoMode => f.write_str("no primary monitor video mode"),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl From<InitError> for GlfwSurfaceError {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl error::Error for GlfwSurfaceError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
      _ => None,
    }
  }
}

/// GLFW surface.
///
/// This type is a helper that exposes two important concepts: the GLFW event receiver that you can
/// use to poll events and the [`GL33Context`], which allows you to perform the rendering part.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,

  /// Wrapped incg context.
  pub context: GL33Context,
}

impl GlfwSurface {
  /// Initialize GLFW to provide an incg environment, creating the window with `create_window`.
  ///
  /// The context version comes from `opt`. Core, forward-compatible profiles are requested for
  /// versions that have them.
  pub fn new(
    opt: WindowOpt,
    create_window: impl FnOnce(
      &mut Glfw,
    ) -> Result<(Window, Receiver<(f64, WindowEvent)>), GlfwSurfaceError>,
  ) -> Result<Self, GlfwSurfaceError> {
    let mut glfw = glfw::init(glfw::FAIL_ON_ERRORS)?;
    let version = opt.gl_version();

    // OpenGL hints
    if version.has_core_profile() {
      glfw.window_hint(glfw::WindowHint::OpenGlProfile(
        glfw::OpenGlProfileHint::Core,
      ));
      glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    }
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(version.major));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(version.minor));
    glfw.window_hint(glfw::WindowHint::Samples(opt.num_samples()));

    let (mut window, events_rx) = create_window(&mut glfw)?;

    window.make_current();
    window.set_all_polling(true);
    window.set_cursor_mode(match opt.cursor_mode() {
      CursorMode::Visible => glfw::CursorMode::Normal,
      CursorMode::Invisible => glfw::CursorMode::Hidden,
      CursorMode::Disabled => glfw::CursorMode::Disabled,
    });
    glfw.set_swap_interval(if opt.vsync() {
      glfw::SwapInterval::Sync(1)
    } else {
      glfw::SwapInterval::None
    });

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);

    let gl = GL33::new().map_err(GlfwSurfaceError::GraphicsStateError)?;
    log::info!("OpenGL {} context created", version);

    let context = GL33Context { window, gl };
    let surface = GlfwSurface { events_rx, context };

    Ok(surface)
  }

  /// Open a window titled `title`, sized and placed according to `opt`.
  pub fn new_gl33(title: &str, opt: WindowOpt) -> Result<Self, GlfwSurfaceError> {
    GlfwSurface::new(opt, |glfw| match opt.dim() {
      WindowDim::Windowed(w, h) => glfw
        .create_window(w, h, title, WindowMode::Windowed)
        .ok_or(GlfwSurfaceError::WindowCreationFailed),

      WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
        let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;
        let mode = monitor
          .get_video_mode()
          .ok_or(GlfwSurfaceError::NoVideoMode)?;

        glfw
          .create_window(mode.width, mode.height, title, WindowMode::FullScreen(monitor))
          .ok_or(GlfwSurfaceError::WindowCreationFailed)
      }),

      WindowDim::FullscreenRestricted(w, h) => glfw.with_primary_monitor(|glfw, monitor| {
        let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;

        glfw
          .create_window(w, h, title, WindowMode::FullScreen(monitor))
          .ok_or(GlfwSurfaceError::WindowCreationFailed)
      }),
    })
  }
}

/// incg OpenGL 3.3 context.
///
/// This type also re-exports the GLFW window, if you need access to it.
#[derive(Debug)]
pub struct GL33Context {
  /// Wrapped GLFW window.
  pub window: Window,

  /// OpenGL 3.3 state.
  gl: GL33,
}

impl GL33Context {
  /// Size of the window’s framebuffer.
  pub fn size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }

  /// Swap the back and front buffers.
  pub fn swap_buffers(&mut self) {
    self.window.swap_buffers();
  }
}

unsafe impl GraphicsContext for GL33Context {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}
