//! Recording backend and scratch directories shared by the integration tests.

#![allow(dead_code)]

use incg::backend::shader::{ProgramError, Shader, StageError, StageType};
use std::cell::Cell;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;
use std::time::{Duration, UNIX_EPOCH};

/// Marker making a stage fail to compile, reported at its line.
pub const COMPILE_ERROR: &str = "#error";

/// Marker making a program fail to link.
pub const LINK_ERROR: &str = "// unresolved";

/// A backend that never talks to a driver.
///
/// Handles are allocated sequentially, and live objects are counted so that tests can check that
/// nothing leaks.
#[derive(Debug, Default)]
pub struct Recorder {
  next_handle: u32,
  pub stages_alive: Rc<Cell<i32>>,
  pub programs_alive: Rc<Cell<i32>>,
  pub compiled: Vec<(StageType, String)>,
}

#[derive(Debug)]
pub struct RecordedStage {
  pub ty: StageType,
  pub source: String,
  alive: Rc<Cell<i32>>,
}

impl Drop for RecordedStage {
  fn drop(&mut self) {
    self.alive.set(self.alive.get() - 1);
  }
}

#[derive(Debug)]
pub struct RecordedProgram {
  pub handle: u32,
  alive: Rc<Cell<i32>>,
}

impl Drop for RecordedProgram {
  fn drop(&mut self) {
    self.alive.set(self.alive.get() - 1);
  }
}

impl Recorder {
  fn stage(&mut self, ty: StageType, source: String) -> RecordedStage {
    self.stages_alive.set(self.stages_alive.get() + 1);
    RecordedStage {
      ty,
      source,
      alive: self.stages_alive.clone(),
    }
  }

  fn program(&mut self) -> RecordedProgram {
    self.next_handle += 1;
    self.programs_alive.set(self.programs_alive.get() + 1);
    RecordedProgram {
      handle: self.next_handle,
      alive: self.programs_alive.clone(),
    }
  }
}

unsafe impl Shader for Recorder {
  type StageRepr = RecordedStage;

  type ProgramRepr = RecordedProgram;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    self.compiled.push((ty, src.to_owned()));

    match locate(src, COMPILE_ERROR) {
      Some((file, line)) => Err(StageError::compilation_failed(
        ty,
        format!("{}({}) : error C0000: syntax error, unexpected #error", file, line),
      )),
      None => Ok(self.stage(ty, src.to_owned())),
    }
  }

  unsafe fn new_stage_binary(
    &mut self,
    ty: StageType,
    binary: &[u8],
    _entry_point: &str,
  ) -> Result<Self::StageRepr, StageError> {
    if binary.is_empty() {
      Err(StageError::UnsupportedFormat(ty))
    } else {
      Ok(self.stage(ty, String::new()))
    }
  }

  unsafe fn new_program(
    &mut self,
    stages: &[Self::StageRepr],
  ) -> Result<Self::ProgramRepr, ProgramError> {
    if stages.iter().any(|stage| stage.source.contains(LINK_ERROR)) {
      Err(ProgramError::link_failed(
        "error: unresolved reference to `shade`",
      ))
    } else {
      Ok(self.program())
    }
  }

  unsafe fn new_program_binary(
    &mut self,
    binary: &[u8],
  ) -> Result<Self::ProgramRepr, ProgramError> {
    if binary.is_empty() {
      Err(ProgramError::UnsupportedFormat)
    } else {
      Ok(self.program())
    }
  }

  fn program_handle(program: &Self::ProgramRepr) -> u32 {
    program.handle
  }
}

/// Source string and line of the first line containing `needle`, following `#line` markers the
/// way a driver does.
fn locate(src: &str, needle: &str) -> Option<(usize, usize)> {
  let mut file = 0;
  let mut line = 1;

  for text in src.lines() {
    if let Some(marker) = text.strip_prefix("#line ") {
      let mut parts = marker.split_whitespace();
      line = parts.next()?.parse().ok()?;
      file = parts.next()?.parse().ok()?;
      continue;
    }

    if text.contains(needle) {
      return Some((file, line));
    }

    line += 1;
  }

  None
}

/// Fresh, empty directory for a test.
pub fn scratch(name: &str) -> PathBuf {
  let dir = env::temp_dir().join(format!("incg-it-{}-{}", name, process::id()));
  let _ = fs::remove_dir_all(&dir);
  fs::create_dir_all(&dir).unwrap();
  dir
}

/// Write a file and push its modification time forward, so that the change is always visible.
pub fn write(path: &Path, content: &str) {
  let existed = path.exists();
  fs::write(path, content).unwrap();

  if existed {
    touch(path);
  }
}

/// Push the modification time of a file ten seconds forward.
pub fn touch(path: &Path) {
  let file = fs::OpenOptions::new().write(true).open(path).unwrap();
  let current = file.metadata().unwrap().modified().unwrap();
  let current = current.duration_since(UNIX_EPOCH).unwrap();
  file
    .set_modified(UNIX_EPOCH + current + Duration::from_secs(10))
    .unwrap();
}
