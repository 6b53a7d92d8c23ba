//! # incg application framework
//!
//! Applications implement [`Application`] and hand it to [`run`], which opens a window and drives
//! the frame loop. The [`Framework`] passed to every callback gives access to the OpenGL backend,
//! the camera and matrices, and the named shader programs.
//!
//! Shader programs declared with [`Framework::initialize_shader`] are watched: whenever one of
//! their source files (includes too) changes on disk, they are rebuilt before the next frame.
//! Programs that fail to rebuild keep running their previous version, and the driver log is
//! printed with file names instead of file ids.
//!
//! # Controls
//!
//! | input              | effect                                   |
//! |--------------------|------------------------------------------|
//! | Escape             | quit                                     |
//! | W / S / A / D      | move the camera                          |
//! | R                  | rebuild every shader program             |
//! | C                  | log the camera                           |
//! | left drag          | orbit (yaw and pitch)                    |
//! | right drag         | pan                                      |
//! | middle drag        | dolly                                    |
//! | scroll             | zoom, and scale the keyboard speed       |
//!
//! Every other key is forwarded to [`Application::key`].

#![deny(missing_docs)]

pub mod cli;
pub mod control;
mod error;
pub mod framework;
pub mod input;
mod runner;
pub mod stats;

pub use crate::cli::Opts;
pub use crate::error::AppError;
pub use crate::framework::Framework;
pub use crate::input::InputAction;
pub use crate::runner::run;
pub use glfw::Key;

/// Application interface.
pub trait Application: Sized {
  /// Window title.
  const TITLE: &'static str;

  /// Load shaders, textures and meshes.
  ///
  /// Failures here are fatal.
  fn bootstrap(framework: &mut Framework) -> Result<Self, AppError>;

  /// Advance the simulation by `dt` seconds.
  fn update(&mut self, _framework: &mut Framework, _dt: f32) {}

  /// Render a frame.
  fn render(&mut self, framework: &mut Framework);

  /// A key not handled by the framework got pressed.
  fn key(&mut self, _framework: &mut Framework, _key: Key) {}

  /// The framebuffer got resized. The viewport and projection are already updated.
  fn resize(&mut self, _framework: &mut Framework) {}

  /// Status line shown in the window title.
  fn panel(&self, _framework: &Framework) -> String {
    String::new()
  }
}
