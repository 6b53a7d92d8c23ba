//! Named, hot-reloadable shader programs.

use log::{error, info};
use std::collections::BTreeMap;
use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use super::diagnostics::Diagnostics;
use super::registry::{FileKey, FileRegistry};
use super::source::flatten;
use super::{display_name, BuildError, ProgramSource, StageSet};
use crate::backend::shader::{ProgramError, Shader, StageError, StageType};

const SPIRV_ENTRY_POINT: &str = "main";

/// A program that failed to rebuild during [`ShaderLoader::reload_all`].
#[derive(Debug)]
pub struct ReloadFailure {
  /// Name of the program.
  pub name: String,
  /// Why it failed.
  pub error: BuildError,
}

struct NamedProgram<B>
where
  B: Shader,
{
  source: ProgramSource,
  program: B::ProgramRepr,
}

/// Shader program loader.
///
/// Owns the registry of source files and the named programs built from them. Programs are always
/// valid: a program is only registered once it built successfully, and a failed rebuild keeps the
/// previous version around.
///
/// Programs are dropped, and so released, along with the loader.
pub struct ShaderLoader<B>
where
  B: Shader,
{
  files: FileRegistry,
  programs: BTreeMap<String, NamedProgram<B>>,
}

impl<B> Default for ShaderLoader<B>
where
  B: Shader,
{
  fn default() -> Self {
    Self::with_file_key(FileKey::default())
  }
}

impl<B> ShaderLoader<B>
where
  B: Shader,
{
  /// Create a loader identifying files by name.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a loader with the given file keying.
  pub fn with_file_key(key: FileKey) -> Self {
    ShaderLoader {
      files: FileRegistry::with_key(key),
      programs: BTreeMap::new(),
    }
  }

  /// Registry of every file read so far.
  pub fn files(&self) -> &FileRegistry {
    &self.files
  }

  /// Flatten and compile a single stage.
  pub fn compile_stage(
    &mut self,
    backend: &mut B,
    ty: StageType,
    path: &Path,
  ) -> Result<B::StageRepr, BuildError> {
    compile_stage(&mut self.files, backend, ty, path)
  }

  /// Build a program, without registering it.
  ///
  /// Intermediate stages are released before returning, whatever the outcome.
  pub fn build(
    &mut self,
    backend: &mut B,
    source: &ProgramSource,
  ) -> Result<B::ProgramRepr, BuildError> {
    build(&mut self.files, backend, source)
  }

  /// Build and register a named program, returning its handle.
  ///
  /// There is no previous version to fall back to here: errors are returned as is.
  pub fn declare(
    &mut self,
    backend: &mut B,
    name: impl Into<String>,
    source: ProgramSource,
  ) -> Result<u32, BuildError> {
    let name = name.into();

    if self.programs.contains_key(&name) {
      return Err(BuildError::AlreadyDeclared(name));
    }

    let program = self.build(backend, &source)?;
    let handle = B::program_handle(&program);
    info!("shader program {} ready ({})", name, handle);

    self.programs.insert(name, NamedProgram { source, program });

    Ok(handle)
  }

  /// Get a program by name.
  pub fn program(&self, name: &str) -> Option<&B::ProgramRepr> {
    self.programs.get(name).map(|named| &named.program)
  }

  /// Native handle of a program by name.
  pub fn handle(&self, name: &str) -> Option<u32> {
    self.program(name).map(B::program_handle)
  }

  /// Source a program was declared with.
  pub fn source(&self, name: &str) -> Option<&ProgramSource> {
    self.programs.get(name).map(|named| &named.source)
  }

  /// Names of the declared programs, in order.
  pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
    self.programs.keys().map(String::as_str)
  }

  /// Whether any file read while building changed on disk since.
  pub fn requires_reload(&self) -> bool {
    self.files.requires_reload()
  }

  /// Rebuild every program.
  ///
  /// A program that rebuilds replaces the previous version, which gets released. A program that
  /// fails keeps its previous version; the error is logged and returned, and the next programs are
  /// still rebuilt.
  pub fn reload_all(&mut self, backend: &mut B) -> Vec<ReloadFailure> {
    for file in self.files.changed() {
      info!("{} changed", file.path.display());
    }

    let files = &mut self.files;
    let mut failures = Vec::new();

    for (name, named) in &mut self.programs {
      match build(files, backend, &named.source) {
        Ok(program) => {
          let old = mem::replace(&mut named.program, program);
          info!(
            "shader program {} reloaded ({} -> {})",
            name,
            B::program_handle(&old),
            B::program_handle(&named.program)
          );
        }

        Err(error) => {
          error!("shader program {} kept its previous version:\n{}", name, error);
          failures.push(ReloadFailure {
            name: name.clone(),
            error,
          });
        }
      }
    }

    failures
  }
}

fn compile_stage<B>(
  files: &mut FileRegistry,
  backend: &mut B,
  ty: StageType,
  path: &Path,
) -> Result<B::StageRepr, BuildError>
where
  B: Shader,
{
  let src = flatten(path, files)?;
  let stage = unsafe { backend.new_stage(ty, src.text()) };

  stage.map_err(|e| stage_error(files, path, e))
}

fn build<B>(
  files: &mut FileRegistry,
  backend: &mut B,
  source: &ProgramSource,
) -> Result<B::ProgramRepr, BuildError>
where
  B: Shader,
{
  match *source {
    ProgramSource::Glsl(ref stages) => {
      let mut reprs = Vec::with_capacity(stages.len());

      for (&ty, path) in stages {
        reprs.push(compile_stage(files, backend, ty, path)?);
      }

      link(files, backend, stages, &reprs)
    }

    ProgramSource::SpirV(ref stages) => {
      let mut reprs = Vec::with_capacity(stages.len());

      for (&ty, path) in stages {
        let binary = read_binary(files, path)?;
        let repr = unsafe { backend.new_stage_binary(ty, &binary, SPIRV_ENTRY_POINT) }
          .map_err(|e| stage_error(files, path, e))?;
        reprs.push(repr);
      }

      link(files, backend, stages, &reprs)
    }

    ProgramSource::Binary(ref path) => {
      let binary = read_binary(files, path)?;
      let program = unsafe { backend.new_program_binary(&binary) };

      program.map_err(|e| program_error(files, display_name(path), vec![path.to_owned()], e))
    }
  }
}

fn link<B>(
  files: &FileRegistry,
  backend: &mut B,
  stages: &StageSet,
  reprs: &[B::StageRepr],
) -> Result<B::ProgramRepr, BuildError>
where
  B: Shader,
{
  let program = unsafe { backend.new_program(reprs) };

  program.map_err(|e| {
    let header = stages
      .values()
      .map(|path| display_name(path))
      .collect::<Vec<_>>()
      .join(" & ");
    let paths = stages.values().cloned().collect();

    program_error(files, header, paths, e)
  })
}

fn read_binary(files: &mut FileRegistry, path: &Path) -> Result<Vec<u8>, BuildError> {
  files.observe(path);

  fs::read(path).map_err(|reason| BuildError::FileNotFound {
    path: path.to_owned(),
    reason,
  })
}

fn stage_error(files: &FileRegistry, path: &Path, e: StageError) -> BuildError {
  match e {
    StageError::CompilationFailed(stage, log) => BuildError::CompileError {
      stage,
      path: path.to_owned(),
      log: Diagnostics::annotate(display_name(path), log, files),
    },
    StageError::UnsupportedType(ty) => BuildError::UnsupportedStage(ty),
    StageError::UnsupportedFormat(_) => BuildError::UnsupportedFormat,
  }
}

fn program_error(
  files: &FileRegistry,
  header: String,
  paths: Vec<PathBuf>,
  e: ProgramError,
) -> BuildError {
  match e {
    ProgramError::LinkFailed(log) => BuildError::LinkError {
      files: paths,
      log: Diagnostics::annotate(header, log, files),
    },
    ProgramError::UnsupportedFormat => BuildError::UnsupportedFormat,
  }
}
