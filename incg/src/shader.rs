//! Shader source pipeline.
//!
//! GLSL sources are plain files on disk. Before being handed to the driver, a stage source is
//! *flattened* ([`source::flatten`]): every `#pragma incg_include "path"` line is replaced with the
//! content of the included file, and `#line <line> <file id>` markers are interleaved so that the
//! driver reports errors against the original files. Every file taking part in a flattening is
//! registered in a [`FileRegistry`], which hands out the file ids used in the markers and remembers
//! the modification time of each file.
//!
//! A [`ShaderLoader`] owns such a registry along with a set of named programs. It can tell when any
//! file on disk changed ([`ShaderLoader::requires_reload`]) and rebuild every program
//! ([`ShaderLoader::reload_all`]). A program that fails to rebuild keeps its previous, working
//! version.
//!
//! Diagnostics coming from the driver are rewritten by [`Diagnostics`]: numeric file ids at the
//! start of log lines are replaced with the registered file paths.

pub mod diagnostics;
pub mod loader;
pub mod mtime;
pub mod registry;
pub mod source;

pub use self::diagnostics::Diagnostics;
pub use self::loader::{ReloadFailure, ShaderLoader};
pub use self::registry::{FileKey, FileRegistry, SourceFile};
pub use self::source::{flatten, FlattenedSource};
pub use crate::backend::shader::{ProgramError, StageError, StageType};

use std::collections::BTreeMap;
use std::error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Source files of the stages of a program, by stage.
pub type StageSet = BTreeMap<StageType, PathBuf>;

/// Where a program comes from.
///
/// The source of a named program is immutable once declared; it’s what the program is rebuilt from
/// on every reload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramSource {
  /// GLSL text sources, flattened and compiled.
  Glsl(StageSet),
  /// Pre-compiled SPIR-V stages, specialized at `main`.
  SpirV(StageSet),
  /// A whole program binary, in the first format reported by the driver.
  Binary(PathBuf),
}

impl ProgramSource {
  /// GLSL program from `(stage, path)` pairs.
  pub fn glsl<I, P>(stages: I) -> Self
  where
    I: IntoIterator<Item = (StageType, P)>,
    P: Into<PathBuf>,
  {
    ProgramSource::Glsl(stages.into_iter().map(|(ty, p)| (ty, p.into())).collect())
  }

  /// SPIR-V program from `(stage, path)` pairs.
  pub fn spirv<I, P>(stages: I) -> Self
  where
    I: IntoIterator<Item = (StageType, P)>,
    P: Into<PathBuf>,
  {
    ProgramSource::SpirV(stages.into_iter().map(|(ty, p)| (ty, p.into())).collect())
  }

  /// Top-level files of the program (includes are not listed).
  pub fn paths(&self) -> Vec<&Path> {
    match *self {
      ProgramSource::Glsl(ref stages) | ProgramSource::SpirV(ref stages) => {
        stages.values().map(PathBuf::as_path).collect()
      }
      ProgramSource::Binary(ref path) => vec![path.as_path()],
    }
  }
}

/// Errors that can occur while building a program.
#[non_exhaustive]
#[derive(Debug)]
pub enum BuildError {
  /// A source file (top-level or included) could not be read.
  FileNotFound {
    /// Path that was tried.
    path: PathBuf,
    /// I/O error.
    reason: io::Error,
  },
  /// A file includes itself, directly or through other files.
  CircularInclude {
    /// Include chain, from the top-level file to the repeated file.
    chain: Vec<PathBuf>,
  },
  /// A stage failed to compile.
  CompileError {
    /// Stage that failed.
    stage: StageType,
    /// Top-level file of the stage.
    path: PathBuf,
    /// Driver log.
    log: Diagnostics,
  },
  /// Stages failed to link.
  LinkError {
    /// Top-level files of the program.
    files: Vec<PathBuf>,
    /// Driver log.
    log: Diagnostics,
  },
  /// The stage type is not supported by the driver.
  UnsupportedStage(StageType),
  /// Binary mode was requested but the driver has no matching binary format.
  UnsupportedFormat,
  /// A program with this name was already declared.
  AlreadyDeclared(String),
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      BuildError::FileNotFound {
        ref path,
        ref reason,
      } => write!(f, "cannot open {}: {}", path.display(), reason),

      BuildError::CircularInclude { ref chain } => {
        f.write_str("circular include: ")?;

        for (i, path) in chain.iter().enumerate() {
          if i > 0 {
            f.write_str(" -> ")?;
          }

          write!(f, "{}", path.display())?;
        }

        Ok(())
      }

      BuildError::CompileError {
        ref stage,
        ref log,
        ..
      } => write!(f, "{} compilation error in {}", stage, log),

      BuildError::LinkError { ref log, .. } => write!(f, "link error in {}", log),

      BuildError::UnsupportedStage(ty) => write!(f, "unsupported {}", ty),

      BuildError::UnsupportedFormat => f.write_str("no supported binary format"),

      BuildError::AlreadyDeclared(ref name) => {
        write!(f, "shader program {} is already declared", name)
      }
    }
  }
}

impl error::Error for BuildError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      BuildError::FileNotFound { reason, .. } => Some(reason),
      _ => None,
    }
  }
}

/// Name of a file, as shown in diagnostics headers.
pub(crate) fn display_name(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}
