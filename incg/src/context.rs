//! Graphics context.
//!
//! A graphics context is an external type typically implemented by windowing crates. It owns the
//! window, the native context and the backend state, and gives access to the backend so that GPU
//! resources can be created.

use crate::backend::shader::Shader;

/// Class of graphics context.
///
/// # Unsafety
///
/// Only one context may be alive per thread, as the backend state is shared between every resource
/// created from it.
pub unsafe trait GraphicsContext: Sized {
  /// Internal type used by the backend to cache, optimize and store data.
  type Backend: Shader;

  /// Access the underlying backend.
  fn backend(&mut self) -> &mut Self::Backend;
}
