//! Include expansion.
//!
//! A line of the exact form `#pragma incg_include "relative/path"` is replaced with the content of
//! the designated file, resolved relative to the directory of the including file. Included files
//! can include other files.
//!
//! The flattened text carries `#line <line> <file id>` markers, meaning “the next line is line
//! `<line>` of file `<file id>`”:
//!
//! - after the first line of every file, `#line 2 <id>`;
//! - before the content of an included file, `#line 1 <id>`;
//! - after the content of an included file, `#line <n + 1> <includer id>`, `n` being the line of
//!   the include directive.
//!
//! The first line of a top-level file is never expanded: it’s reserved for `#version`.

use regex::Regex;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use super::registry::FileRegistry;
use super::BuildError;

const INCLUDE_PATTERN: &str = r#"^#pragma\s+incg_include\s+"([^"]*)""#;
const MARKER_PATTERN: &str = r"^#line\s+(\d+)\s+(\d+)\s*$";

/// A source with its includes expanded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlattenedSource {
  text: String,
  files: Vec<usize>,
}

impl FlattenedSource {
  /// Flattened text, markers included.
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Consume into the flattened text.
  pub fn into_text(self) -> String {
    self.text
  }

  /// Ids of the files that took part, top-level file first, in order of first use.
  pub fn files(&self) -> &[usize] {
    &self.files
  }

  /// Origin `(file id, line)` of every line of the flattened text that is not a marker.
  pub fn origins(&self) -> Vec<(usize, usize)> {
    let marker = Regex::new(MARKER_PATTERN).unwrap();

    let mut file = self.files.first().copied().unwrap_or(0);
    let mut line = 1;
    let mut origins = Vec::new();

    for text in self.text.lines() {
      if let Some(caps) = marker.captures(text) {
        line = caps[1].parse().unwrap_or(line);
        file = caps[2].parse().unwrap_or(file);
      } else {
        origins.push((file, line));
        line += 1;
      }
    }

    origins
  }
}

/// Read a file and expand its includes.
///
/// Every file read is registered in `registry` and gets its modification time refreshed, whether
/// it could be read or not.
pub fn flatten(path: &Path, registry: &mut FileRegistry) -> Result<FlattenedSource, BuildError> {
  let mut flattener = Flattener {
    include: Regex::new(INCLUDE_PATTERN).unwrap(),
    registry,
    chain: Vec::new(),
    out: FlattenedSource {
      text: String::new(),
      files: Vec::new(),
    },
  };

  flattener.file(path, true)?;

  Ok(flattener.out)
}

struct Flattener<'a> {
  include: Regex,
  registry: &'a mut FileRegistry,
  // canonical paths of the files being expanded
  chain: Vec<PathBuf>,
  out: FlattenedSource,
}

impl<'a> Flattener<'a> {
  fn file(&mut self, path: &Path, top: bool) -> Result<(), BuildError> {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_owned());

    if self.chain.contains(&canonical) {
      let mut chain = self.chain.clone();
      chain.push(canonical);
      return Err(BuildError::CircularInclude { chain });
    }

    let id = self.registry.observe(path);
    let content = fs::read_to_string(path).map_err(|reason| BuildError::FileNotFound {
      path: path.to_owned(),
      reason,
    })?;

    if !self.out.files.contains(&id) {
      self.out.files.push(id);
    }

    if !top {
      let _ = writeln!(self.out.text, "#line 1 {}", id);
    }

    self.chain.push(canonical);
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    for (index, line) in content.lines().enumerate() {
      let number = index + 1;
      let line = line.replace('\r', "");

      let included = if top && number == 1 {
        None
      } else {
        self
          .include
          .captures(&line)
          .map(|caps| dir.join(&caps[1]))
      };

      match included {
        Some(included) => {
          self.file(&included, false)?;
          let _ = writeln!(self.out.text, "#line {} {}", number + 1, id);
        }

        None => {
          self.out.text.push_str(&line);
          self.out.text.push('\n');

          if number == 1 {
            let _ = writeln!(self.out.text, "#line 2 {}", id);
          }
        }
      }
    }

    self.chain.pop();

    Ok(())
  }
}
