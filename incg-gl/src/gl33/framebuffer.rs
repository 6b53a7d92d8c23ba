//! Offscreen framebuffers.

use crate::gl33::state::GLState;
use crate::gl33::texture::{Texture, TextureError, TextureFormat};
use crate::gl33::GL33;
use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::rc::Rc;

/// Errors that can happen while creating framebuffers.
#[non_exhaustive]
#[derive(Debug, Eq, PartialEq)]
pub enum FramebufferError {
  /// An attachment could not be created.
  TextureError(TextureError),
  /// The framebuffer is not complete.
  Incomplete(String),
}

impl FramebufferError {
  /// Incomplete framebuffer, from its OpenGL status.
  pub fn incomplete(status: GLenum) -> Self {
    FramebufferError::Incomplete(incompleteness_reason(status).to_owned())
  }
}

impl fmt::Display for FramebufferError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      FramebufferError::TextureError(ref e) => write!(f, "framebuffer texture error: {}", e),
      FramebufferError::Incomplete(ref e) => write!(f, "incomplete framebuffer: {}", e),
    }
  }
}

impl error::Error for FramebufferError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      FramebufferError::TextureError(e) => Some(e),
      _ => None,
    }
  }
}

impl From<TextureError> for FramebufferError {
  fn from(e: TextureError) -> Self {
    FramebufferError::TextureError(e)
  }
}

/// A framebuffer with texture attachments.
///
/// The framebuffer owns its attachments. On drop, the framebuffer is deleted before its textures.
#[derive(Debug)]
pub struct Framebuffer {
  handle: GLuint,
  size: [u32; 2],
  state: Rc<RefCell<GLState>>,
  color: Vec<Texture>,
  depth: Option<Texture>,
}

impl Framebuffer {
  /// Create a framebuffer with one color attachment per format in `color_formats`, and a depth
  /// attachment if `depth_format` is set.
  ///
  /// The back buffer is bound again afterwards.
  pub fn new(
    backend: &mut GL33,
    width: u32,
    height: u32,
    color_formats: &[TextureFormat],
    depth_format: Option<TextureFormat>,
  ) -> Result<Self, FramebufferError> {
    let color = color_formats
      .iter()
      .map(|&format| Texture::new(backend, width, height, format))
      .collect::<Result<Vec<_>, _>>()?;
    let depth = depth_format
      .map(|format| Texture::new(backend, width, height, format))
      .transpose()?;

    let mut handle: GLuint = 0;
    let framebuffer = unsafe {
      gl::GenFramebuffers(1, &mut handle);

      Framebuffer {
        handle,
        size: [width, height],
        state: backend.state.clone(),
        color,
        depth,
      }
    };

    let status = unsafe {
      let mut state = backend.state.borrow_mut();
      state.bind_draw_framebuffer(handle);

      let mut draw_buffers = Vec::with_capacity(framebuffer.color.len());
      for (i, texture) in framebuffer.color.iter().enumerate() {
        let attachment = gl::COLOR_ATTACHMENT0 + i as GLenum;
        gl::FramebufferTexture2D(
          gl::DRAW_FRAMEBUFFER,
          attachment,
          gl::TEXTURE_2D,
          texture.handle(),
          0,
        );
        draw_buffers.push(attachment);
      }

      if let Some(ref texture) = framebuffer.depth {
        gl::FramebufferTexture2D(
          gl::DRAW_FRAMEBUFFER,
          gl::DEPTH_ATTACHMENT,
          gl::TEXTURE_2D,
          texture.handle(),
          0,
        );
      }

      if draw_buffers.is_empty() {
        gl::DrawBuffer(gl::NONE);
      } else {
        gl::DrawBuffers(draw_buffers.len() as GLsizei, draw_buffers.as_ptr());
      }

      let status = gl::CheckFramebufferStatus(gl::DRAW_FRAMEBUFFER);
      state.bind_draw_framebuffer(0);
      status
    };

    if status == gl::FRAMEBUFFER_COMPLETE {
      Ok(framebuffer)
    } else {
      Err(FramebufferError::incomplete(status))
    }
  }

  /// Render into this framebuffer, with a viewport covering it.
  pub fn bind(&self, backend: &mut GL33) {
    let mut state = backend.state.borrow_mut();

    unsafe {
      state.bind_draw_framebuffer(self.handle);
      state.set_viewport([0, 0, self.size[0] as GLint, self.size[1] as GLint]);
    }
  }

  /// Native handle of the framebuffer.
  pub fn handle(&self) -> GLuint {
    self.handle
  }

  /// Size of the framebuffer.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }

  /// Color attachment `index`.
  pub fn color(&self, index: usize) -> Option<&Texture> {
    self.color.get(index)
  }

  /// Depth attachment.
  pub fn depth(&self) -> Option<&Texture> {
    self.depth.as_ref()
  }
}

impl Drop for Framebuffer {
  fn drop(&mut self) {
    self.state.borrow_mut().forget_framebuffer(self.handle);

    unsafe {
      gl::DeleteFramebuffers(1, &self.handle);
    }
  }
}

fn incompleteness_reason(status: GLenum) -> &'static str {
  match status {
    gl::FRAMEBUFFER_UNDEFINED => "undefined",
    gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "incomplete attachment",
    gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "missing attachment",
    gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "incomplete draw buffer",
    gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "incomplete read buffer",
    gl::FRAMEBUFFER_UNSUPPORTED => "unsupported",
    gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "incomplete multisample",
    gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => "incomplete layer targets",
    _ => "unknown error",
  }
}
