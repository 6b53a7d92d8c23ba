//! OpenGL 3.3 backend.
//!
//! The backend type is [`GL33`]. Resources keep a shared handle on the backend state so that they
//! can keep its binding cache coherent when they die.

mod framebuffer;
mod mesh;
mod query;
mod shader;
mod state;
mod texture;
mod uniform;

pub use self::framebuffer::{Framebuffer, FramebufferError};
pub use self::mesh::{Mesh, MeshError, Primitive, NORMAL_LOCATION, POSITION_LOCATION, UV_LOCATION};
pub use self::query::TimerQuery;
pub use self::shader::{Program, Stage};
pub use self::state::{GLState, StateQueryError};
pub use self::texture::{Texture, TextureError, TextureFormat, Wrap};
pub use self::uniform::{ProgramGuard, Uniformable};
use std::cell::RefCell;
use std::rc::Rc;

/// An OpenGL 3.3 backend.
///
/// Only one can exist per thread, as it owns the cached state of the current OpenGL context.
#[derive(Debug)]
pub struct GL33 {
  pub(crate) state: Rc<RefCell<GLState>>,
}

impl GL33 {
  /// Create a new OpenGL 3.3 backend.
  ///
  /// An OpenGL context must be current and its functions loaded.
  pub fn new() -> Result<Self, StateQueryError> {
    GLState::new().map(|state| GL33 {
      state: Rc::new(RefCell::new(state)),
    })
  }

  /// Internal access to the backend state.
  ///
  /// # Unsafety
  ///
  /// This method is **highly unsafe** as it exposes the internals of the backend. Changing the
  /// OpenGL state behind its back makes its cache lie.
  pub unsafe fn state(&self) -> &Rc<RefCell<GLState>> {
    &self.state
  }

  /// Set the viewport.
  pub fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
    unsafe {
      self
        .state
        .borrow_mut()
        .set_viewport([x, y, width as i32, height as i32])
    };
  }

  /// Clear the color and depth buffers of the currently bound framebuffer.
  pub fn clear(&mut self, color: [f32; 4]) {
    unsafe {
      self.state.borrow_mut().set_clear_color(color);
      gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
    }
  }

  /// Clear the depth buffer only, so that the next draws show on top of the previous ones.
  pub fn clear_depth(&mut self) {
    unsafe { gl::Clear(gl::DEPTH_BUFFER_BIT) };
  }

  /// Enable or disable depth testing.
  pub fn set_depth_test(&mut self, enabled: bool) {
    unsafe { self.state.borrow_mut().set_depth_test(enabled) };
  }

  /// Render to the default framebuffer.
  pub fn bind_back_buffer(&mut self) {
    unsafe { self.state.borrow_mut().bind_draw_framebuffer(0) };
  }
}
