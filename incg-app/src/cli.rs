//! Command line options shared by applications.

use incg::shader::FileKey;
use incg_windowing::{GlVersion, WindowDim, WindowOpt};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

/// Command line options.
#[derive(Clone, Debug, StructOpt)]
pub struct Opts {
  #[structopt(parse(from_os_str))]
  /// Directory holding the `shader/` and `data/` directories. Defaults to the directory of the
  /// executable.
  pub resource_path: Option<PathBuf>,

  #[structopt(long, default_value = "60")]
  /// Frame rate cap. 0 disables the cap.
  pub max_fps: u32,

  #[structopt(long, default_value = "1024")]
  /// Window width.
  pub width: u32,

  #[structopt(long, default_value = "768")]
  /// Window height.
  pub height: u32,

  #[structopt(long, default_value = "3.3")]
  /// OpenGL context version, as MAJOR.MINOR.
  pub gl_version: GlVersion,

  #[structopt(long)]
  /// Tell shader files apart by full path instead of file name.
  pub full_path_ids: bool,

  #[structopt(long)]
  /// Do not rebuild shaders when their files change (R still does).
  pub no_watch: bool,
}

impl Opts {
  /// Resource directory, falling back to the directory of the executable.
  pub fn resource_path(&self) -> PathBuf {
    if let Some(ref path) = self.resource_path {
      return path.clone();
    }

    env::current_exe()
      .ok()
      .and_then(|exe| exe.parent().map(PathBuf::from))
      .unwrap_or_else(|| PathBuf::from("."))
  }

  /// Window options.
  pub fn window_opt(&self) -> WindowOpt {
    WindowOpt::default()
      .set_dim(WindowDim::Windowed(self.width.max(1), self.height.max(1)))
      .set_gl_version(self.gl_version)
  }

  /// How shader files are told apart.
  pub fn file_key(&self) -> FileKey {
    if self.full_path_ids {
      FileKey::FullPath
    } else {
      FileKey::BaseName
    }
  }

  /// Whether shader files are watched.
  pub fn watch(&self) -> bool {
    !self.no_watch
  }

  /// Minimum duration of a frame, if capped.
  pub fn frame_duration(&self) -> Option<Duration> {
    if self.max_fps == 0 {
      None
    } else {
      Some(Duration::from_secs_f64(1. / self.max_fps as f64))
    }
  }
}
