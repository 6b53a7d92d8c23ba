//! Services shared with applications.

use crate::cli::Opts;
use crate::control::CameraControl;
use crate::error::AppError;
use crate::input::InputAction;
use crate::stats::FrameStats;
use cgmath::Matrix4;
use incg::camera::{hor_plus_projection, CameraSystem};
use incg::context::GraphicsContext as _;
use incg::shader::{ProgramSource, ReloadFailure, ShaderLoader};
use incg_gl::gl33::ProgramGuard;
use incg_gl::GL33;
use incg_glfw::GL33Context;
use log::info;
use std::path::{Path, PathBuf};

/// Window, camera and shader programs of a running application.
///
/// Shader programs are released before the context goes away.
pub struct Framework {
  shaders: ShaderLoader<GL33>,
  resource_path: PathBuf,
  control: CameraControl,
  view: Matrix4<f32>,
  projection: Matrix4<f32>,
  resolution: [u32; 2],
  /// GPU frame times.
  pub stats: FrameStats,
  title: String,
  context: GL33Context,
}

impl Framework {
  pub(crate) fn new(mut context: GL33Context, opts: &Opts) -> Self {
    let [width, height] = context.size();

    let backend = context.backend();
    backend.set_depth_test(true);

    let mut framework = Framework {
      shaders: ShaderLoader::with_file_key(opts.file_key()),
      resource_path: opts.resource_path(),
      control: CameraControl::new(CameraSystem::default()),
      view: Matrix4::from_scale(1.),
      projection: Matrix4::from_scale(1.),
      resolution: [1, 1],
      stats: FrameStats::new(),
      title: String::new(),
      context,
    };

    framework.update_camera();
    framework.resize(width, height);
    framework
  }

  /// Directory holding the application resources.
  pub fn resource_path(&self) -> &Path {
    &self.resource_path
  }

  /// Path of a resource.
  pub fn resource(&self, relative: impl AsRef<Path>) -> PathBuf {
    self.resource_path.join(relative)
  }

  /// The OpenGL backend, to create resources with.
  pub fn backend(&mut self) -> &mut GL33 {
    self.context.backend()
  }

  /// Build and register a named shader program.
  pub fn initialize_shader(
    &mut self,
    name: &str,
    source: ProgramSource,
  ) -> Result<(), AppError> {
    self
      .shaders
      .declare(self.context.backend(), name, source)
      .map(|_| ())
      .map_err(|error| AppError::ShaderBuildFailed {
        name: name.to_owned(),
        error,
      })
  }

  /// Start using a named shader program.
  pub fn shader(&mut self, name: &str) -> Result<ProgramGuard<'_>, AppError> {
    let program = self
      .shaders
      .program(name)
      .ok_or_else(|| AppError::UnknownShader(name.to_owned()))?;

    Ok(ProgramGuard::new(self.context.backend(), program))
  }

  /// Native handle of a named shader program.
  pub fn shader_handle(&self, name: &str) -> Option<u32> {
    self.shaders.handle(name)
  }

  /// The shader loader.
  pub fn shaders(&self) -> &ShaderLoader<GL33> {
    &self.shaders
  }

  /// Whether a shader file changed on disk.
  pub fn shaders_changed(&self) -> bool {
    self.shaders.requires_reload()
  }

  /// Rebuild every shader program. Programs that fail keep their previous version.
  pub fn update_shader_programs(&mut self) -> Vec<ReloadFailure> {
    info!("reloading shaders");
    self.shaders.reload_all(self.context.backend())
  }

  /// The camera.
  pub fn camera(&self) -> &CameraSystem {
    &self.control.camera
  }

  /// Replace the camera.
  pub fn set_camera(&mut self, camera: CameraSystem) {
    self.control.camera = camera;
    self.update_camera();
  }

  /// Recompute the view matrix from the camera.
  pub fn update_camera(&mut self) {
    self.view = self.control.camera.view_matrix();
  }

  /// World-to-view matrix.
  pub fn view_matrix(&self) -> Matrix4<f32> {
    self.view
  }

  /// Projection matrix.
  pub fn projection_matrix(&self) -> Matrix4<f32> {
    self.projection
  }

  /// Framebuffer size.
  pub fn resolution(&self) -> [u32; 2] {
    self.resolution
  }

  /// Adapt the viewport and projection to a new framebuffer size. Sizes are clamped to at least 1.
  pub fn resize(&mut self, width: u32, height: u32) {
    let (width, height) = (width.max(1), height.max(1));

    self.resolution = [width, height];
    self.context.backend().set_viewport(0, 0, width, height);
    self.projection = hor_plus_projection(width, height);
  }

  /// Log the camera.
  pub fn log_camera(&self) {
    let cam = &self.control.camera;
    let (d, u, p) = (cam.view_dir, cam.up_dir, cam.position);

    info!("cam-dir: {}, {}, {}", d.x, d.y, d.z);
    info!("cam-up:  {}, {}, {}", u.x, u.y, u.z);
    info!("cam-pos: {}, {}, {}", p.x, p.y, p.z);
  }

  // actions not meant for the application
  pub(crate) fn process(&mut self, action: &InputAction) {
    match *action {
      InputAction::ReloadShaders => {
        self.update_shader_programs();
      }

      InputAction::LogCamera => self.log_camera(),

      InputAction::Resized { width, height } => self.resize(width, height),

      ref action => {
        if self.control.apply(action) {
          self.update_camera();
        }
      }
    }
  }

  pub(crate) fn should_close(&self) -> bool {
    self.context.window.should_close()
  }

  pub(crate) fn poll_events(&mut self) {
    self.context.window.glfw.poll_events();
  }

  pub(crate) fn set_title(&mut self, title: String) {
    if title != self.title {
      self.context.window.set_title(&title);
      self.title = title;
    }
  }

  pub(crate) fn swap_buffers(&mut self) {
    self.context.swap_buffers();
  }
}
