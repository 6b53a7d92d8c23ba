//! # incg windowing
//!
//! This is the base, abstract crate for windowing common types in incg. The `incg` crate gives you
//! shaders, meshes and cameras, but it doesn’t give you a way to create an OpenGL context. That is
//! the job of backend crates, such as `incg-glfw`, that all read the same options.
//!
//! # What’s included
//!
//! - [`WindowDim`]: abstraction over the dimension of a window and its mode (windowed, fullscreen,
//!   fullscreen restricted).
//! - [`WindowOpt`]: hints to customize the window integration, such as whether the cursor should be
//!   hidden or which OpenGL version to ask for.
//! - [`GlVersion`]: an OpenGL context version, parsable from strings such as `"4.6"`.

#![deny(missing_docs)]

use std::error;
use std::fmt;
use std::str::FromStr;

/// Dimension metrics.
///
///   - `Windowed(width, height)` opens in windowed mode with the wished resolution.
///   - `Fullscreen` opens in fullscreen mode by using the primary monitor resolution.
///   - `FullscreenRestricted(width, height)` is a mix between `Windowed(width, height)` and
///     `Fullscreen`. It opens in fullscreen mode by using the wished resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// Windowed mode.
  Windowed(u32, u32),
  /// Fullscreen mode (adapt to your screen).
  Fullscreen,
  /// Fullscreen mode with restricted viewport dimension.
  FullscreenRestricted(u32, u32),
}

impl WindowDim {
  /// Requested size, if known before opening the window.
  pub fn size(self) -> Option<[u32; 2]> {
    match self {
      WindowDim::Windowed(w, h) | WindowDim::FullscreenRestricted(w, h) => Some([w, h]),
      WindowDim::Fullscreen => None,
    }
  }
}

/// Cursor mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorMode {
  /// The cursor is always visible.
  Visible,
  /// The cursor exists yet has been disabled.
  Invisible,
  /// The cursor is disabled.
  Disabled,
}

/// OpenGL context version.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GlVersion {
  /// Major version.
  pub major: u32,
  /// Minor version.
  pub minor: u32,
}

impl GlVersion {
  /// Create a version.
  pub const fn new(major: u32, minor: u32) -> Self {
    GlVersion { major, minor }
  }

  /// Whether a core, forward-compatible profile exists for this version.
  pub fn has_core_profile(self) -> bool {
    self >= GlVersion::new(3, 2)
  }
}

impl Default for GlVersion {
  fn default() -> Self {
    GlVersion::new(3, 3)
  }
}

impl fmt::Display for GlVersion {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    write!(f, "{}.{}", self.major, self.minor)
  }
}

/// Error that can happen while parsing a [`GlVersion`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlVersionError(String);

impl fmt::Display for GlVersionError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    write!(f, "invalid OpenGL version {:?}, expected MAJOR.MINOR", self.0)
  }
}

impl error::Error for GlVersionError {}

impl FromStr for GlVersion {
  type Err = GlVersionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || GlVersionError(s.to_owned());
    let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
    let major = major.parse().map_err(|_| invalid())?;
    let minor = minor.parse().map_err(|_| invalid())?;

    if major == 0 {
      return Err(invalid());
    }

    Ok(GlVersion { major, minor })
  }
}

/// Different window options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to start
/// with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  cursor_mode: CursorMode,
  num_samples: Option<u32>,
  gl_version: GlVersion,
  vsync: bool,
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to `WindowDim::Windowed(1024, 768)`.
  /// - `cursor_mode` set to `CursorMode::Visible`.
  /// - `num_samples` set to `None`.
  /// - `gl_version` set to 3.3.
  /// - `vsync` disabled.
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed(1024, 768),
      cursor_mode: CursorMode::Visible,
      num_samples: None,
      gl_version: GlVersion::default(),
      vsync: false,
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> WindowDim {
    self.dim
  }

  /// Hide, unhide or disable the cursor. Default to `CursorMode::Visible`.
  #[inline]
  pub fn set_cursor_mode(self, mode: CursorMode) -> Self {
    WindowOpt {
      cursor_mode: mode,
      ..self
    }
  }

  /// Get the cursor mode.
  #[inline]
  pub fn cursor_mode(&self) -> CursorMode {
    self.cursor_mode
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }

  /// Set the OpenGL version of the context.
  #[inline]
  pub fn set_gl_version(self, gl_version: GlVersion) -> Self {
    WindowOpt { gl_version, ..self }
  }

  /// Get the OpenGL version of the context.
  #[inline]
  pub fn gl_version(&self) -> GlVersion {
    self.gl_version
  }

  /// Synchronize buffer swaps with the screen refresh.
  #[inline]
  pub fn set_vsync(self, vsync: bool) -> Self {
    WindowOpt { vsync, ..self }
  }

  /// Whether buffer swaps are synchronized with the screen refresh.
  #[inline]
  pub fn vsync(&self) -> bool {
    self.vsync
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gl_version_parsing() {
    assert_eq!("4.6".parse(), Ok(GlVersion::new(4, 6)));
    assert_eq!(" 3.3 ".parse(), Ok(GlVersion::new(3, 3)));
    assert!("4".parse::<GlVersion>().is_err());
    assert!("a.b".parse::<GlVersion>().is_err());
    assert!("0.9".parse::<GlVersion>().is_err());
    assert_eq!(GlVersion::new(4, 1).to_string(), "4.1");
  }

  #[test]
  fn core_profiles() {
    assert!(GlVersion::default().has_core_profile());
    assert!(GlVersion::new(3, 2).has_core_profile());
    assert!(!GlVersion::new(3, 1).has_core_profile());
    assert!(!GlVersion::new(2, 1).has_core_profile());
  }

  #[test]
  fn options_builder() {
    let opt = WindowOpt::default()
      .set_dim(WindowDim::Windowed(800, 600))
      .set_num_samples(4)
      .set_gl_version(GlVersion::new(4, 6))
      .set_cursor_mode(CursorMode::Disabled);

    assert_eq!(opt.dim().size(), Some([800, 600]));
    assert_eq!(opt.num_samples(), Some(4));
    assert_eq!(opt.gl_version(), GlVersion::new(4, 6));
    assert_eq!(opt.cursor_mode(), CursorMode::Disabled);
    assert!(!opt.vsync());
    assert_eq!(WindowDim::Fullscreen.size(), None);
  }
}
