//! Driver log annotation.
//!
//! Drivers report errors against the source string numbers set by `#line` markers, which are
//! registry file ids. Two layouts are recognized:
//!
//! - `<id>(<line>) : <message>`, as printed by NVIDIA drivers;
//! - `<id>:<line>(<column>): <message>`, as printed by Mesa.
//!
//! The leading id is replaced with the registered path. Ids unknown to the registry are left as
//! they are, and so is every other line.

use regex::Regex;
use std::fmt;

use super::registry::FileRegistry;

const NVIDIA_PATTERN: &str = r"^(\d+)(\(\d+\)\s*:.*)$";
const MESA_PATTERN: &str = r"^(\d+)(:\d+\(\d+\)\s*:.*)$";

/// A driver log, along with its annotated version.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostics {
  header: String,
  raw: String,
  annotated: String,
}

impl Diagnostics {
  /// Annotate a raw driver log.
  ///
  /// `header` names the file(s) the log is about.
  pub fn annotate(header: impl Into<String>, raw: impl Into<String>, files: &FileRegistry) -> Self {
    let raw = raw.into();
    let patterns = [
      Regex::new(NVIDIA_PATTERN).unwrap(),
      Regex::new(MESA_PATTERN).unwrap(),
    ];

    let annotated = raw
      .trim_end_matches('\0')
      .lines()
      .map(|line| annotate_line(line, &patterns, files))
      .collect::<Vec<_>>()
      .join("\n");

    Diagnostics {
      header: header.into(),
      raw,
      annotated,
    }
  }

  /// File name(s) the log is about.
  pub fn header(&self) -> &str {
    &self.header
  }

  /// Log as the driver printed it.
  pub fn raw(&self) -> &str {
    &self.raw
  }

  /// Log with file ids replaced by file paths.
  pub fn annotated(&self) -> &str {
    &self.annotated
  }
}

impl fmt::Display for Diagnostics {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    write!(f, "{}:", self.header)?;

    for line in self.annotated.lines() {
      write!(f, "\n {}", line)?;
    }

    Ok(())
  }
}

fn annotate_line(line: &str, patterns: &[Regex], files: &FileRegistry) -> String {
  for re in patterns {
    if let Some(caps) = re.captures(line) {
      let path = caps[1].parse().ok().and_then(|id| files.path(id));

      return match path {
        Some(path) => format!("{}{}", path.display(), &caps[2]),
        None => line.to_owned(),
      };
    }
  }

  line.to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::Path;

  fn registry() -> FileRegistry {
    let mut reg = FileRegistry::new();
    reg.id_for(Path::new("shader/map.fs.glsl"));
    reg.id_for(Path::new("shader/common.glsl"));
    reg
  }

  #[test]
  fn nvidia_layout() {
    let log = "1(12) : error C1008: undefined variable \"foo\"\n0(3) : warning C7022: unused";
    let diag = Diagnostics::annotate("map.fs.glsl", log, &registry());

    assert_eq!(
      diag.annotated(),
      "shader/common.glsl(12) : error C1008: undefined variable \"foo\"\n\
       shader/map.fs.glsl(3) : warning C7022: unused"
    );
    assert_eq!(diag.raw(), log);
  }

  #[test]
  fn mesa_layout() {
    let log = "1:7(15): error: syntax error, unexpected IDENTIFIER";
    let diag = Diagnostics::annotate("map.fs.glsl", log, &registry());

    assert_eq!(
      diag.annotated(),
      "shader/common.glsl:7(15): error: syntax error, unexpected IDENTIFIER"
    );
  }

  #[test]
  fn unknown_ids_and_other_lines_stay() {
    let log = "42(1) : error C0000: nope\nlink failed\0";
    let diag = Diagnostics::annotate("a.vert & a.frag", log, &registry());

    assert_eq!(diag.annotated(), "42(1) : error C0000: nope\nlink failed");
  }

  #[test]
  fn display_has_header() {
    let diag = Diagnostics::annotate("map.fs.glsl", "0(1) : error", &registry());
    assert_eq!(diag.to_string(), "map.fs.glsl:\n shader/map.fs.glsl(1) : error");
  }
}
