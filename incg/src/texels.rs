//! Decoded images, ready to be uploaded as textures.

use image::{DynamicImage, ImageError};
use log::info;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// RGBA8 texels, rows ordered bottom to top.
#[derive(Clone, Debug, PartialEq)]
pub struct Texels {
  width: u32,
  height: u32,
  pixels: Vec<u8>,
}

/// Errors that can happen while loading images.
#[derive(Debug)]
pub enum TexelsError {
  /// The image could not be opened or decoded.
  CannotLoad {
    /// Path of the image.
    path: PathBuf,
    /// Decoder error.
    reason: ImageError,
  },
}

impl fmt::Display for TexelsError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      TexelsError::CannotLoad {
        ref path,
        ref reason,
      } => write!(f, "cannot load image {}: {}", path.display(), reason),
    }
  }
}

impl Error for TexelsError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      TexelsError::CannotLoad { reason, .. } => Some(reason),
    }
  }
}

impl Texels {
  /// Open and decode an image.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, TexelsError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|reason| TexelsError::CannotLoad {
      path: path.to_owned(),
      reason,
    })?;
    let texels = Self::from_image(img);

    info!(
      "loaded {} ({}×{})",
      path.display(),
      texels.width,
      texels.height
    );

    Ok(texels)
  }

  /// Convert a decoded image. Images are stored top to bottom: rows get flipped.
  pub fn from_image(img: DynamicImage) -> Self {
    let rgba = img.flipv().to_rgba8();
    let (width, height) = rgba.dimensions();

    Texels {
      width,
      height,
      pixels: rgba.into_raw(),
    }
  }

  /// Width in texels.
  pub fn width(&self) -> u32 {
    self.width
  }

  /// Height in texels.
  pub fn height(&self) -> u32 {
    self.height
  }

  /// Raw RGBA8 bytes.
  pub fn pixels(&self) -> &[u8] {
    &self.pixels
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgba, RgbaImage};

  #[test]
  fn rows_start_at_the_bottom() {
    let mut img = RgbaImage::new(2, 2);
    img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
    img.put_pixel(1, 1, Rgba([0, 0, 255, 255]));

    let texels = Texels::from_image(DynamicImage::ImageRgba8(img));

    assert_eq!((texels.width(), texels.height()), (2, 2));
    assert_eq!(texels.pixels().len(), 16);
    // top-left red ends up in the last row
    assert_eq!(&texels.pixels()[8..12], &[255, 0, 0, 255]);
    assert_eq!(&texels.pixels()[4..8], &[0, 0, 255, 255]);
  }

  #[test]
  fn missing_image() {
    let path = std::env::temp_dir().join("incg-no-such-image.png");

    match Texels::load(&path) {
      Err(TexelsError::CannotLoad { path: p, .. }) => assert_eq!(p, path),
      other => panic!("expected a load error, got {:?}", other),
    }
  }
}
