//! File modification times.

use std::fs;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

/// Last modification time of a file, as a duration since the Unix epoch.
///
/// Returns [`Duration::ZERO`] if the file cannot be statted. A file that disappears thus compares
/// as changed against a previously recorded time, while a file that never existed keeps comparing
/// as unchanged.
pub fn mtime(path: impl AsRef<Path>) -> Duration {
  fs::metadata(path)
    .and_then(|meta| meta.modified())
    .ok()
    .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
    .unwrap_or(Duration::ZERO)
}
