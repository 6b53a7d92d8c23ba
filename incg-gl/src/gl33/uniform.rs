//! Uniform upload and program scopes.

use crate::gl33::mesh::Mesh;
use crate::gl33::shader::Program;
use crate::gl33::texture::Texture;
use crate::gl33::GL33;
use gl::types::*;
use std::ffi::CString;

/// Types that can be uploaded to a uniform of the currently used program.
///
/// # Unsafety
///
/// Implementors must upload with the OpenGL function matching the GLSL type they stand for.
pub unsafe trait Uniformable {
  /// Upload the value to `location`.
  unsafe fn update(self, location: GLint);
}

macro_rules! impl_Uniformable {
  (vec $t:ty, $f:tt) => {
    unsafe impl Uniformable for $t {
      unsafe fn update(self, location: GLint) {
        gl::$f(location, 1, self.as_ptr() as _);
      }
    }
  };

  (mat $t:ty, $f:tt) => {
    unsafe impl Uniformable for $t {
      unsafe fn update(self, location: GLint) {
        gl::$f(location, 1, gl::FALSE, self.as_ptr() as _);
      }
    }
  };

  ($t:ty, $f:tt) => {
    unsafe impl Uniformable for $t {
      unsafe fn update(self, location: GLint) {
        gl::$f(location, self);
      }
    }
  };
}

impl_Uniformable!(i32, Uniform1i);
impl_Uniformable!(u32, Uniform1ui);
impl_Uniformable!(f32, Uniform1f);

impl_Uniformable!(vec [i32; 2], Uniform2iv);
impl_Uniformable!(vec [u32; 2], Uniform2uiv);
impl_Uniformable!(vec [f32; 2], Uniform2fv);
impl_Uniformable!(vec [f32; 3], Uniform3fv);
impl_Uniformable!(vec [f32; 4], Uniform4fv);

impl_Uniformable!(mat [[f32; 3]; 3], UniformMatrix3fv);
impl_Uniformable!(mat [[f32; 4]; 4], UniformMatrix4fv);

// booleans are uploaded as integers
unsafe impl Uniformable for bool {
  unsafe fn update(self, location: GLint) {
    gl::Uniform1i(location, self as GLint);
  }
}

/// A program in use.
///
/// Uniforms, textures and draws issued through the guard all apply to its program.
#[derive(Debug)]
pub struct ProgramGuard<'a> {
  backend: &'a mut GL33,
  program: &'a Program,
}

impl<'a> ProgramGuard<'a> {
  /// Start using `program`.
  pub fn new(backend: &'a mut GL33, program: &'a Program) -> Self {
    unsafe { backend.state.borrow_mut().use_program(program.handle) };
    ProgramGuard { backend, program }
  }

  /// Location of a uniform, if it is active.
  pub fn location(&self, name: &str) -> Option<GLint> {
    let c_name = CString::new(name.as_bytes()).ok()?;
    let location = unsafe { gl::GetUniformLocation(self.program.handle, c_name.as_ptr()) };

    if location < 0 {
      None
    } else {
      Some(location)
    }
  }

  /// Set a uniform.
  ///
  /// Returns `false` if the program has no such active uniform. Unused uniforms get optimized away
  /// by drivers, so this is not an error.
  pub fn set<T>(&mut self, name: &str, value: T) -> bool
  where
    T: Uniformable,
  {
    match self.location(name) {
      Some(location) => {
        unsafe { value.update(location) };
        true
      }

      None => false,
    }
  }

  /// Bind a texture to a texture unit.
  ///
  /// The sampler uniform must be set to the same unit.
  pub fn bind_texture(&mut self, unit: u32, texture: &Texture) {
    let mut state = self.backend.state.borrow_mut();

    unsafe {
      state.set_texture_unit(unit);
      state.bind_texture(gl::TEXTURE_2D, texture.handle());
    }
  }

  /// Draw a mesh.
  pub fn draw(&mut self, mesh: &Mesh) {
    unsafe {
      self.backend.state.borrow_mut().bind_vertex_array(mesh.vao());
      mesh.draw_elements();
    }
  }
}
