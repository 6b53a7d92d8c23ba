use incg::mesh::ObjError;
use incg::shader::BuildError;
use incg::texels::TexelsError;
use incg_gl::gl33::{FramebufferError, MeshError, TextureError};
use incg_glfw::GlfwSurfaceError;
use std::error;
use std::fmt;

/// What can go wrong while starting or running an application.
///
/// Shader errors are only fatal at startup; once running, programs that fail to rebuild keep their
/// previous version.
#[non_exhaustive]
#[derive(Debug)]
pub enum AppError {
  /// The window or its context could not be created.
  CannotCreateSurface(GlfwSurfaceError),
  /// A shader program failed to build.
  ShaderBuildFailed {
    /// Name of the program.
    name: String,
    /// Why it failed.
    error: BuildError,
  },
  /// A shader program was used but never declared.
  UnknownShader(String),
  /// An image could not be loaded.
  CannotLoadTexels(TexelsError),
  /// A model could not be loaded.
  CannotLoadModel(ObjError),
  /// A texture could not be created.
  CannotCreateTexture(TextureError),
  /// A framebuffer could not be created.
  CannotCreateFramebuffer(FramebufferError),
  /// A mesh could not be uploaded.
  CannotUploadMesh(MeshError),
}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      AppError::CannotCreateSurface(ref e) => write!(f, "cannot create rendering surface: {}", e),
      AppError::ShaderBuildFailed {
        ref name,
        ref error,
      } => write!(f, "cannot build shader program {}: {}", name, error),
      AppError::UnknownShader(ref name) => write!(f, "unknown shader program {}", name),
      AppError::CannotLoadTexels(ref e) => write!(f, "cannot load image: {}", e),
      AppError::CannotLoadModel(ref e) => write!(f, "cannot load model: {}", e),
      AppError::CannotCreateTexture(ref e) => write!(f, "cannot create texture: {}", e),
      AppError::CannotCreateFramebuffer(ref e) => write!(f, "cannot create framebuffer: {}", e),
      AppError::CannotUploadMesh(ref e) => write!(f, "cannot upload mesh: {}", e),
    }
  }
}

impl error::Error for AppError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      AppError::CannotCreateSurface(e) => Some(e),
      AppError::ShaderBuildFailed { error, .. } => Some(error),
      AppError::UnknownShader(_) => None,
      AppError::CannotLoadTexels(e) => Some(e),
      AppError::CannotLoadModel(e) => Some(e),
      AppError::CannotCreateTexture(e) => Some(e),
      AppError::CannotCreateFramebuffer(e) => Some(e),
      AppError::CannotUploadMesh(e) => Some(e),
    }
  }
}

impl From<GlfwSurfaceError> for AppError {
  fn from(e: GlfwSurfaceError) -> Self {
    AppError::CannotCreateSurface(e)
  }
}

impl From<TexelsError> for AppError {
  fn from(e: TexelsError) -> Self {
    AppError::CannotLoadTexels(e)
  }
}

impl From<ObjError> for AppError {
  fn from(e: ObjError) -> Self {
    AppError::CannotLoadModel(e)
  }
}

impl From<TextureError> for AppError {
  fn from(e: TextureError) -> Self {
    AppError::CannotCreateTexture(e)
  }
}

impl From<FramebufferError> for AppError {
  fn from(e: FramebufferError) -> Self {
    AppError::CannotCreateFramebuffer(e)
  }
}

impl From<MeshError> for AppError {
  fn from(e: MeshError) -> Self {
    AppError::CannotUploadMesh(e)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sources() {
    let e = AppError::from(TextureError::InvalidSize {
      width: 0,
      height: 1,
    });

    assert_eq!(
      e.to_string(),
      "cannot create texture: invalid texture size: 0×1"
    );
    assert!(error::Error::source(&e).is_some());
    assert!(error::Error::source(&AppError::UnknownShader("map".to_owned())).is_none());
  }
}
