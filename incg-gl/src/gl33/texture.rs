//! 2D textures.

use crate::gl33::state::GLState;
use crate::gl33::GL33;
use gl::types::*;
use incg::texels::Texels;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::os::raw::c_void;
use std::ptr::null;
use std::rc::Rc;

/// Internal format of a texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureFormat {
  /// 8-bit normalized RGBA.
  Rgba8,
  /// 16-bit floating RGBA.
  Rgba16F,
  /// 32-bit floating RGBA.
  Rgba32F,
  /// 24-bit depth.
  Depth24,
  /// 32-bit floating depth.
  Depth32F,
}

impl TextureFormat {
  /// Whether this is a depth format.
  pub fn is_depth(self) -> bool {
    matches!(self, TextureFormat::Depth24 | TextureFormat::Depth32F)
  }

  /// Size of a texel, in bytes.
  pub fn bytes_per_texel(self) -> usize {
    match self {
      TextureFormat::Rgba8 => 4,
      TextureFormat::Rgba16F => 8,
      TextureFormat::Rgba32F => 16,
      TextureFormat::Depth24 => 4,
      TextureFormat::Depth32F => 4,
    }
  }

  // internal format, pixel format and pixel type
  fn opengl_format(self) -> (GLenum, GLenum, GLenum) {
    match self {
      TextureFormat::Rgba8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
      TextureFormat::Rgba16F => (gl::RGBA16F, gl::RGBA, gl::FLOAT),
      TextureFormat::Rgba32F => (gl::RGBA32F, gl::RGBA, gl::FLOAT),
      TextureFormat::Depth24 => (gl::DEPTH_COMPONENT24, gl::DEPTH_COMPONENT, gl::UNSIGNED_INT),
      TextureFormat::Depth32F => (gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT),
    }
  }
}

/// Texture coordinates wrapping.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Wrap {
  /// Repeat the texture.
  Repeat,
  /// Repeat the texture, mirroring it every other time.
  MirroredRepeat,
  /// Clamp coordinates to the edge texels.
  ClampToEdge,
}

impl Wrap {
  fn to_glenum(self) -> GLenum {
    match self {
      Wrap::Repeat => gl::REPEAT,
      Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
      Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
    }
  }
}

/// Errors that can happen while creating textures.
#[non_exhaustive]
#[derive(Debug, Eq, PartialEq)]
pub enum TextureError {
  /// A texture cannot be empty.
  InvalidSize {
    /// Requested width.
    width: u32,
    /// Requested height.
    height: u32,
  },
  /// The texels do not fill the texture.
  DataSizeMismatch {
    /// Number of bytes the texture needs.
    expected: usize,
    /// Number of bytes provided.
    found: usize,
  },
}

impl fmt::Display for TextureError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      TextureError::InvalidSize { width, height } => {
        write!(f, "invalid texture size: {}×{}", width, height)
      }
      TextureError::DataSizeMismatch { expected, found } => write!(
        f,
        "texture data size mismatch: expected {} bytes, found {}",
        expected, found
      ),
    }
  }
}

impl error::Error for TextureError {}

/// A 2D texture.
///
/// Textures are move-only; the native texture is deleted on drop.
#[derive(Debug)]
pub struct Texture {
  handle: GLuint,
  size: [u32; 2],
  format: TextureFormat,
  state: Rc<RefCell<GLState>>,
}

impl Texture {
  /// Create an empty texture, for instance to render into.
  ///
  /// Color textures are linearly filtered and repeat; depth textures are not filtered and clamp to
  /// the edge.
  pub fn new(
    backend: &mut GL33,
    width: u32,
    height: u32,
    format: TextureFormat,
  ) -> Result<Self, TextureError> {
    check_size(width, height, None, format)?;

    let (filter, wrap) = if format.is_depth() {
      (gl::NEAREST, Wrap::ClampToEdge)
    } else {
      (gl::LINEAR, Wrap::Repeat)
    };

    unsafe {
      let texture = Self::create(backend, width, height, format);
      set_parameters(filter, filter, wrap);
      texture.upload(null());

      Ok(texture)
    }
  }

  /// Create a mipmapped RGBA8 texture from decoded texels.
  pub fn from_texels(backend: &mut GL33, texels: &Texels, wrap: Wrap) -> Result<Self, TextureError> {
    let (width, height) = (texels.width(), texels.height());
    check_size(
      width,
      height,
      Some(texels.pixels().len()),
      TextureFormat::Rgba8,
    )?;

    unsafe {
      let texture = Self::create(backend, width, height, TextureFormat::Rgba8);
      set_parameters(gl::LINEAR_MIPMAP_NEAREST, gl::LINEAR, wrap);
      texture.upload(texels.pixels().as_ptr() as *const c_void);
      gl::GenerateMipmap(gl::TEXTURE_2D);

      Ok(texture)
    }
  }

  // generate and bind a new texture
  unsafe fn create(backend: &mut GL33, width: u32, height: u32, format: TextureFormat) -> Self {
    let mut handle: GLuint = 0;
    gl::GenTextures(1, &mut handle);
    backend.state.borrow_mut().bind_texture(gl::TEXTURE_2D, handle);

    Texture {
      handle,
      size: [width, height],
      format,
      state: backend.state.clone(),
    }
  }

  // upload level 0 of the bound texture
  unsafe fn upload(&self, data: *const c_void) {
    let (internal_format, pixel_format, pixel_type) = self.format.opengl_format();

    gl::TexImage2D(
      gl::TEXTURE_2D,
      0,
      internal_format as GLint,
      self.size[0] as GLsizei,
      self.size[1] as GLsizei,
      0,
      pixel_format,
      pixel_type,
      data,
    );
  }

  /// Native handle of the texture.
  pub fn handle(&self) -> GLuint {
    self.handle
  }

  /// Size of the texture.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }

  /// Internal format of the texture.
  pub fn format(&self) -> TextureFormat {
    self.format
  }
}

impl Drop for Texture {
  fn drop(&mut self) {
    self.state.borrow_mut().forget_texture(self.handle);

    unsafe {
      gl::DeleteTextures(1, &self.handle);
    }
  }
}

unsafe fn set_parameters(min_filter: GLenum, mag_filter: GLenum, wrap: Wrap) {
  let wrap = wrap.to_glenum();

  gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min_filter as GLint);
  gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag_filter as GLint);
  gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap as GLint);
  gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap as GLint);
}

fn check_size(
  width: u32,
  height: u32,
  data_len: Option<usize>,
  format: TextureFormat,
) -> Result<(), TextureError> {
  if width == 0 || height == 0 {
    return Err(TextureError::InvalidSize { width, height });
  }

  match data_len {
    Some(found) => {
      let expected = width as usize * height as usize * format.bytes_per_texel();

      if found == expected {
        Ok(())
      } else {
        Err(TextureError::DataSizeMismatch { expected, found })
      }
    }

    None => Ok(()),
  }
}
