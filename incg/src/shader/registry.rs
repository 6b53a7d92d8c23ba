//! Source file registry.
//!
//! Every file read while building programs gets a small integer id. Ids are used in `#line`
//! markers so that the driver reports errors with them, and are turned back into paths when
//! diagnostics are printed. The registry also remembers the modification time observed at the last
//! read of every file, which is what reload detection compares against.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::mtime::mtime;

/// How files are told apart.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FileKey {
  /// By file name only.
  ///
  /// Two files with the same name in different directories share one id. Only the first one
  /// registered is watched: edits to the other files never trigger a reload. Diagnostics stay
  /// short and match what the framework always printed.
  BaseName,
  /// By canonical path.
  ///
  /// The directory of a file is canonicalized rather than the file itself, so a file keeps its
  /// id whether it exists or not.
  FullPath,
}

impl Default for FileKey {
  fn default() -> Self {
    FileKey::BaseName
  }
}

/// A file known to the registry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceFile {
  /// Id used in `#line` markers.
  pub id: usize,
  /// Path the file was first registered with.
  pub path: PathBuf,
  /// Modification time observed at the last read.
  pub mtime: Duration,
}

/// Registry of every file that took part in a program build.
///
/// Records are never removed.
#[derive(Debug, Default)]
pub struct FileRegistry {
  key: FileKey,
  files: Vec<SourceFile>,
  ids: HashMap<OsString, usize>,
}

impl FileRegistry {
  /// Create an empty registry keying files by name.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create an empty registry with the given keying.
  pub fn with_key(key: FileKey) -> Self {
    FileRegistry {
      key,
      ..Self::default()
    }
  }

  /// Keying in use.
  pub fn key(&self) -> FileKey {
    self.key
  }

  /// Id of a file, registering it if needed.
  ///
  /// A newly registered file gets the next sequential id, starting at 0, and its current
  /// modification time.
  pub fn id_for(&mut self, path: &Path) -> usize {
    let key = self.key_of(path);

    if let Some(&id) = self.ids.get(&key) {
      return id;
    }

    let id = self.files.len();
    self.files.push(SourceFile {
      id,
      path: path.to_owned(),
      mtime: mtime(path),
    });
    self.ids.insert(key, id);

    id
  }

  /// Register a file that is about to be read and store its current modification time.
  pub fn observe(&mut self, path: &Path) -> usize {
    let id = self.id_for(path);
    self.refresh(id);
    id
  }

  /// Store the current modification time of a file.
  ///
  /// The time is read from the path the file was first registered with.
  pub fn refresh(&mut self, id: usize) {
    if let Some(file) = self.files.get_mut(id) {
      file.mtime = mtime(&file.path);
    }
  }

  /// Look a file up by id.
  pub fn get(&self, id: usize) -> Option<&SourceFile> {
    self.files.get(id)
  }

  /// Path of a file by id.
  pub fn path(&self, id: usize) -> Option<&Path> {
    self.get(id).map(|file| file.path.as_path())
  }

  /// All registered files, by id.
  pub fn files(&self) -> &[SourceFile] {
    &self.files
  }

  /// Number of registered files.
  pub fn len(&self) -> usize {
    self.files.len()
  }

  /// Whether no file has been registered yet.
  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Files whose modification time differs from the one observed at their last read.
  pub fn changed(&self) -> impl Iterator<Item = &SourceFile> + '_ {
    self.files.iter().filter(|file| mtime(&file.path) != file.mtime)
  }

  /// Whether any file changed since it was last read.
  ///
  /// This doesn’t update anything: it keeps answering `true` until the files are read again.
  pub fn requires_reload(&self) -> bool {
    self.changed().next().is_some()
  }

  fn key_of(&self, path: &Path) -> OsString {
    match self.key {
      FileKey::BaseName => path
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| path.as_os_str().to_owned()),

      FileKey::FullPath => full_path(path).into_os_string(),
    }
  }
}

fn full_path(path: &Path) -> PathBuf {
  let dir = match path.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => dir,
    _ => Path::new("."),
  };

  match (fs::canonicalize(dir), path.file_name()) {
    (Ok(dir), Some(name)) => dir.join(name),
    _ => fs::canonicalize(path).unwrap_or_else(|_| path.to_owned()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::env;
  use std::fs::File;
  use std::process;
  use std::time::UNIX_EPOCH;

  fn scratch(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("incg-registry-{}-{}", name, process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  fn touch(path: &Path) {
    let file = fs::OpenOptions::new().write(true).open(path).unwrap();
    let next = UNIX_EPOCH + mtime(path) + Duration::from_secs(10);
    file.set_modified(next).unwrap();
  }

  #[test]
  fn sequential_ids() {
    let mut reg = FileRegistry::new();

    assert_eq!(reg.id_for(Path::new("shader/a.vert")), 0);
    assert_eq!(reg.id_for(Path::new("shader/a.frag")), 1);
    assert_eq!(reg.id_for(Path::new("shader/a.vert")), 0);
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.path(1), Some(Path::new("shader/a.frag")));
    assert_eq!(reg.path(2), None);
  }

  #[test]
  fn same_name_aliases_by_default() {
    let mut reg = FileRegistry::new();
    let a = reg.id_for(Path::new("one/common.glsl"));
    let b = reg.id_for(Path::new("two/common.glsl"));

    assert_eq!(a, b);
    assert_eq!(reg.path(a), Some(Path::new("one/common.glsl")));
  }

  #[test]
  fn full_path_keying_separates_directories() {
    let mut reg = FileRegistry::with_key(FileKey::FullPath);
    let a = reg.id_for(Path::new("one/common.glsl"));
    let b = reg.id_for(Path::new("two/common.glsl"));

    assert_ne!(a, b);
  }

  #[test]
  fn full_path_id_survives_file_creation() {
    let dir = scratch("late");
    let late = dir.join(".").join("late.glsl");

    let mut reg = FileRegistry::with_key(FileKey::FullPath);
    let id = reg.observe(&late);
    assert!(!reg.requires_reload());

    File::create(&late).unwrap();
    assert!(reg.requires_reload());

    assert_eq!(reg.observe(&late), id);
    assert_eq!(reg.observe(&dir.join("late.glsl")), id);
    assert_eq!(reg.len(), 1);
    assert!(!reg.requires_reload());
  }

  #[test]
  fn reload_is_a_pure_query() {
    let dir = scratch("pure");
    let path = dir.join("a.glsl");
    File::create(&path).unwrap();

    let mut reg = FileRegistry::new();
    let id = reg.observe(&path);
    assert!(!reg.requires_reload());

    touch(&path);
    assert!(reg.requires_reload());
    assert!(reg.requires_reload());
    assert_eq!(reg.changed().map(|f| f.id).collect::<Vec<_>>(), vec![id]);

    reg.refresh(id);
    assert!(!reg.requires_reload());
  }

  #[test]
  fn vanished_and_missing_files() {
    let dir = scratch("vanish");
    let present = dir.join("present.glsl");
    File::create(&present).unwrap();

    let mut reg = FileRegistry::new();
    reg.observe(&present);
    reg.observe(&dir.join("never.glsl"));
    assert!(!reg.requires_reload());

    fs::remove_file(&present).unwrap();
    assert!(reg.requires_reload());
  }
}
