//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::marker::PhantomData;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

// minimal number of texture units an implementation must provide
const MIN_TEXTURE_UNITS: usize = 48;

/// Cached value.
///
/// A cached value is used to prevent issuing costly GPU commands if we know the target value is
/// already set to what the command tries to set.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// Explicitly invalidate a value, forcing the next command to run.
  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  /// A non-cached value is always invalid; a cached one is invalid if it differs from `new_val`.
  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }

  fn is(&self, val: &T) -> bool {
    self.0.as_ref() == Some(val)
  }
}

/// The graphics state.
///
/// This type represents the current state of the OpenGL context. It forwards the few state
/// changes the framework needs and adds a small cache layer over them to prevent issuing the same
/// API call with the same parameters.
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  // viewport
  viewport: Cached<[GLint; 4]>,

  // clear buffers
  clear_color: Cached<[GLfloat; 4]>,

  // depth test
  depth_test: Cached<bool>,

  // texture
  current_texture_unit: Cached<GLuint>,
  bound_textures: Vec<(GLenum, GLuint)>,

  // buffers
  bound_array_buffer: Cached<GLuint>,

  // framebuffer
  bound_draw_framebuffer: Cached<GLuint>,

  // vertex array
  bound_vertex_array: Cached<GLuint>,

  // shader program
  current_program: Cached<GLuint>,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// Only one can be created per thread.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();
          Self::get_from_context()
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  fn get_from_context() -> Result<Self, StateQueryError> {
    unsafe {
      let viewport = Cached::new(get_ctx_viewport());
      let clear_color = Cached::new(get_ctx_clear_color());
      let depth_test = Cached::new(get_ctx_depth_test()?);
      let current_texture_unit = Cached::new(get_ctx_current_texture_unit());
      let bound_textures = vec![(gl::TEXTURE_2D, 0); MIN_TEXTURE_UNITS];
      let bound_array_buffer = Cached::new(get_ctx_integer(gl::ARRAY_BUFFER_BINDING));
      let bound_draw_framebuffer = Cached::new(get_ctx_integer(gl::DRAW_FRAMEBUFFER_BINDING));
      let bound_vertex_array = Cached::new(get_ctx_integer(gl::VERTEX_ARRAY_BINDING));
      let current_program = Cached::new(get_ctx_integer(gl::CURRENT_PROGRAM));

      Ok(GLState {
        _a: PhantomData,
        viewport,
        clear_color,
        depth_test,
        current_texture_unit,
        bound_textures,
        bound_array_buffer,
        bound_draw_framebuffer,
        bound_vertex_array,
        current_program,
      })
    }
  }

  /// Invalidate the whole cache.
  ///
  /// Use it after letting foreign code, such as a UI renderer, touch the context.
  pub fn invalidate(&mut self) {
    self.viewport.invalidate();
    self.clear_color.invalidate();
    self.depth_test.invalidate();
    self.current_texture_unit.invalidate();
    self.bound_array_buffer.invalidate();
    self.bound_draw_framebuffer.invalidate();
    self.bound_vertex_array.invalidate();
    self.current_program.invalidate();

    for t in &mut self.bound_textures {
      *t = (gl::TEXTURE_2D, 0);
    }
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.is_invalid(&viewport) {
      gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
      self.viewport.set(viewport);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, clear_color: [GLfloat; 4]) {
    if self.clear_color.is_invalid(&clear_color) {
      gl::ClearColor(
        clear_color[0],
        clear_color[1],
        clear_color[2],
        clear_color[3],
      );
      self.clear_color.set(clear_color);
    }
  }

  pub(crate) unsafe fn set_depth_test(&mut self, enabled: bool) {
    if self.depth_test.is_invalid(&enabled) {
      if enabled {
        gl::Enable(gl::DEPTH_TEST);
      } else {
        gl::Disable(gl::DEPTH_TEST);
      }

      self.depth_test.set(enabled);
    }
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    if self.current_texture_unit.is_invalid(&unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit);
      self.current_texture_unit.set(unit);
    }
  }

  pub(crate) unsafe fn bind_texture(&mut self, target: GLenum, handle: GLuint) {
    let unit = match self.current_texture_unit.0 {
      Some(unit) => unit as usize,

      // unknown active unit: bind without caching
      None => {
        gl::BindTexture(target, handle);
        return;
      }
    };

    match self.bound_textures.get(unit).cloned() {
      Some((target_, handle_)) if target != target_ || handle != handle_ => {
        gl::BindTexture(target, handle);
        self.bound_textures[unit] = (target, handle);
      }

      None => {
        gl::BindTexture(target, handle);

        // not enough registered texture units; let’s grow a bit more
        self.bound_textures.resize(unit + 1, (gl::TEXTURE_2D, 0));
        self.bound_textures[unit] = (target, handle);
      }

      _ => (), // cached
    }
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint) {
    if self.bound_array_buffer.is_invalid(&handle) {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
      self.bound_array_buffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_draw_framebuffer(&mut self, handle: GLuint) {
    if self.bound_draw_framebuffer.is_invalid(&handle) {
      gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, handle);
      self.bound_draw_framebuffer.set(handle);
    }
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint) {
    if self.bound_vertex_array.is_invalid(&handle) {
      gl::BindVertexArray(handle);
      self.bound_vertex_array.set(handle);
    }
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program.is_invalid(&handle) {
      gl::UseProgram(handle);
      self.current_program.set(handle);
    }
  }

  // The forget_* functions are called right before a native object gets deleted. OpenGL unbinds
  // deleted objects and recycles their names, so the cache must not remember them.

  pub(crate) fn forget_texture(&mut self, handle: GLuint) {
    for t in &mut self.bound_textures {
      if t.1 == handle {
        *t = (gl::TEXTURE_2D, 0);
      }
    }
  }

  pub(crate) fn forget_array_buffer(&mut self, handle: GLuint) {
    if self.bound_array_buffer.is(&handle) {
      self.bound_array_buffer.set(0);
    }
  }

  pub(crate) fn forget_framebuffer(&mut self, handle: GLuint) {
    if self.bound_draw_framebuffer.is(&handle) {
      self.bound_draw_framebuffer.set(0);
    }
  }

  pub(crate) fn forget_vertex_array(&mut self, handle: GLuint) {
    if self.bound_vertex_array.is(&handle) {
      self.bound_vertex_array.set(0);
    }
  }

  // a deleted program stays in use until another one replaces it
  pub(crate) fn forget_program(&mut self, handle: GLuint) {
    if self.current_program.is(&handle) {
      self.current_program.invalidate();
    }
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
  /// Corrupted depth test state.
  UnknownDepthTestState(GLboolean),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownDepthTestState(ref s) => write!(f, "unknown depth test state: {}", s),
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn get_ctx_viewport() -> [GLint; 4] {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
  data
}

unsafe fn get_ctx_clear_color() -> [GLfloat; 4] {
  let mut data = [0.; 4];
  gl::GetFloatv(gl::COLOR_CLEAR_VALUE, data.as_mut_ptr());
  data
}

unsafe fn get_ctx_depth_test() -> Result<bool, StateQueryError> {
  let state = gl::IsEnabled(gl::DEPTH_TEST);

  match state {
    gl::TRUE => Ok(true),
    gl::FALSE => Ok(false),
    _ => Err(StateQueryError::UnknownDepthTestState(state)),
  }
}

unsafe fn get_ctx_current_texture_unit() -> GLuint {
  let mut active_texture = gl::TEXTURE0 as GLint;
  gl::GetIntegerv(gl::ACTIVE_TEXTURE, &mut active_texture);
  (active_texture as GLuint).saturating_sub(gl::TEXTURE0)
}

unsafe fn get_ctx_integer(name: GLenum) -> GLuint {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(name, &mut bound);
  bound as GLuint
}
