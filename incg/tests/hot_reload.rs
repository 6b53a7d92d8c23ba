mod common;

use common::{scratch, touch, write, Recorder, COMPILE_ERROR, LINK_ERROR};
use incg::shader::{BuildError, FileKey, ProgramSource, ShaderLoader, StageType};
use std::path::Path;

const VERT: &str = "#version 330 core\n#pragma incg_include \"common.glsl\"\nvoid main() {}\n";
const FRAG: &str = "#version 330 core\nout vec4 frag;\nvoid main() { frag = vec4(1.); }\n";
const COMMON: &str = "uniform mat4 viewMatrix;\nuniform mat4 projMatrix;\n";

fn program(dir: &Path, name: &str) -> ProgramSource {
  ProgramSource::glsl(vec![
    (StageType::VertexShader, dir.join(format!("{}.vert", name))),
    (StageType::FragmentShader, dir.join(format!("{}.frag", name))),
  ])
}

fn setup(dir: &Path, names: &[&str]) {
  write(&dir.join("common.glsl"), COMMON);

  for name in names {
    write(&dir.join(format!("{}.vert", name)), VERT);
    write(&dir.join(format!("{}.frag", name)), FRAG);
  }
}

#[test]
fn nothing_to_reload_after_a_build() {
  let dir = scratch("fresh");
  write(&dir.join("a.vert"), "#version 330 core\nvoid main() {}\n");
  write(&dir.join("a.frag"), FRAG);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  loader.declare(&mut backend, "a", program(&dir, "a")).unwrap();

  assert!(!loader.requires_reload());
}

#[test]
fn touched_files_require_reload_until_reloaded() {
  let dir = scratch("touch");
  setup(&dir, &["p"]);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  loader.declare(&mut backend, "p", program(&dir, "p")).unwrap();

  for file in &["p.vert", "p.frag", "common.glsl"] {
    touch(&dir.join(file));
    assert!(loader.requires_reload(), "{} should trigger a reload", file);
    assert!(loader.requires_reload());

    assert!(loader.reload_all(&mut backend).is_empty());
    assert!(!loader.requires_reload());
  }
}

#[test]
fn include_change_swaps_program() {
  let dir = scratch("swap");
  setup(&dir, &["a"]);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  let before = loader.declare(&mut backend, "P", program(&dir, "a")).unwrap();

  write(&dir.join("common.glsl"), "uniform mat4 viewMatrix;\n");
  assert!(loader.requires_reload());

  let failures = loader.reload_all(&mut backend);
  assert!(failures.is_empty());
  assert_ne!(loader.handle("P"), Some(before));
  assert!(!loader.requires_reload());

  // the old program was released along the way
  assert_eq!(backend.programs_alive.get(), 1);
  assert_eq!(backend.stages_alive.get(), 0);
}

#[test]
fn broken_program_keeps_previous_handle() {
  let dir = scratch("broken");
  setup(&dir, &["p", "q"]);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  let p = loader.declare(&mut backend, "P", program(&dir, "p")).unwrap();
  let q = loader.declare(&mut backend, "Q", program(&dir, "q")).unwrap();

  write(
    &dir.join("q.frag"),
    &format!("#version 330 core\nout vec4 frag;\n{}\n", COMPILE_ERROR),
  );
  touch(&dir.join("common.glsl"));

  let failures = loader.reload_all(&mut backend);

  assert_eq!(loader.handle("Q"), Some(q));
  assert_ne!(loader.handle("P"), Some(p));
  assert_eq!(failures.len(), 1);
  assert_eq!(failures[0].name, "Q");

  match failures[0].error {
    BuildError::CompileError {
      stage,
      ref path,
      ref log,
    } => {
      assert_eq!(stage, StageType::FragmentShader);
      assert_eq!(path, &dir.join("q.frag"));
      assert_eq!(log.header(), "q.frag");
      assert!(log.annotated().starts_with(&format!("{}(3) :", dir.join("q.frag").display())));
    }
    ref e => panic!("expected a compile error, got {:?}", e),
  }

  let message = failures[0].error.to_string();
  assert!(message.contains("q.frag"));

  // nothing half-built is left behind
  assert_eq!(backend.stages_alive.get(), 0);
  assert_eq!(backend.programs_alive.get(), 2);

  // the failed attempt read the files: no reload until they change again
  assert!(!loader.requires_reload());

  write(&dir.join("q.frag"), FRAG);
  assert!(loader.requires_reload());
  assert!(loader.reload_all(&mut backend).is_empty());
  assert_ne!(loader.handle("Q"), Some(q));
}

#[test]
fn errors_in_includes_name_the_include() {
  let dir = scratch("include-error");
  setup(&dir, &["a"]);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  loader.declare(&mut backend, "a", program(&dir, "a")).unwrap();

  write(&dir.join("common.glsl"), &format!("uniform float t;\n{}\n", COMPILE_ERROR));
  let failures = loader.reload_all(&mut backend);

  assert_eq!(failures.len(), 1);
  match failures[0].error {
    BuildError::CompileError { ref log, .. } => {
      assert_eq!(log.header(), "a.vert");
      assert_eq!(
        log.annotated(),
        format!(
          "{}(2) : error C0000: syntax error, unexpected #error",
          dir.join("common.glsl").display()
        )
      );
    }
    ref e => panic!("expected a compile error, got {:?}", e),
  }
}

#[test]
fn link_errors_name_every_stage() {
  let dir = scratch("link");
  write(&dir.join("a.vert"), &format!("#version 330 core\n{}\n", LINK_ERROR));
  write(&dir.join("a.frag"), FRAG);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();

  match loader.declare(&mut backend, "a", program(&dir, "a")) {
    Err(BuildError::LinkError { files, log }) => {
      assert_eq!(files, vec![dir.join("a.vert"), dir.join("a.frag")]);
      assert_eq!(log.header(), "a.vert & a.frag");
    }
    other => panic!("expected a link error, got {:?}", other),
  }

  assert_eq!(backend.stages_alive.get(), 0);
  assert_eq!(backend.programs_alive.get(), 0);
}

#[test]
fn first_build_failure_is_reported() {
  let dir = scratch("first");
  write(&dir.join("a.frag"), FRAG);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();

  match loader.declare(&mut backend, "a", program(&dir, "a")) {
    Err(BuildError::FileNotFound { path, .. }) => assert_eq!(path, dir.join("a.vert")),
    other => panic!("expected a missing file, got {:?}", other),
  }

  assert_eq!(loader.handle("a"), None);
  assert_eq!(loader.names().count(), 0);
}

#[test]
fn names_are_declared_once() {
  let dir = scratch("twice");
  setup(&dir, &["a"]);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  loader.declare(&mut backend, "a", program(&dir, "a")).unwrap();

  match loader.declare(&mut backend, "a", program(&dir, "a")) {
    Err(BuildError::AlreadyDeclared(name)) => assert_eq!(name, "a"),
    other => panic!("expected a duplicate, got {:?}", other),
  }
}

#[test]
fn binary_programs() {
  let dir = scratch("binary");
  std::fs::write(dir.join("prog.bin"), b"\xde\xad\xbe\xef").unwrap();
  std::fs::write(dir.join("empty.bin"), b"").unwrap();

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  let before = loader
    .declare(&mut backend, "bin", ProgramSource::Binary(dir.join("prog.bin")))
    .unwrap();

  match loader.declare(&mut backend, "empty", ProgramSource::Binary(dir.join("empty.bin"))) {
    Err(BuildError::UnsupportedFormat) => (),
    other => panic!("expected an unsupported format, got {:?}", other),
  }

  // binaries are watched too
  touch(&dir.join("prog.bin"));
  assert!(loader.requires_reload());
  assert!(loader.reload_all(&mut backend).is_empty());
  assert_ne!(loader.handle("bin"), Some(before));
  assert!(backend.compiled.is_empty());
}

#[test]
fn spirv_stages() {
  let dir = scratch("spirv");
  std::fs::write(dir.join("a.vert.spv"), b"\x03\x02\x23\x07").unwrap();
  std::fs::write(dir.join("a.frag.spv"), b"").unwrap();

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  let source = ProgramSource::spirv(vec![
    (StageType::VertexShader, dir.join("a.vert.spv")),
    (StageType::FragmentShader, dir.join("a.frag.spv")),
  ]);

  match loader.declare(&mut backend, "a", source) {
    Err(BuildError::UnsupportedFormat) => (),
    other => panic!("expected an unsupported format, got {:?}", other),
  }

  assert_eq!(backend.stages_alive.get(), 0);
}

#[test]
fn dropping_the_loader_releases_programs() {
  let dir = scratch("drop");
  setup(&dir, &["a", "b"]);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  loader.declare(&mut backend, "a", program(&dir, "a")).unwrap();
  loader.declare(&mut backend, "b", program(&dir, "b")).unwrap();
  assert_eq!(backend.programs_alive.get(), 2);

  drop(loader);
  assert_eq!(backend.programs_alive.get(), 0);
}

#[test]
fn same_named_files_alias_by_default() {
  let dir = scratch("alias");
  std::fs::create_dir_all(dir.join("one")).unwrap();
  std::fs::create_dir_all(dir.join("two")).unwrap();
  write(&dir.join("one/common.glsl"), COMMON);
  write(&dir.join("two/common.glsl"), COMMON);
  write(&dir.join("one/a.vert"), VERT);
  write(&dir.join("two/a.frag"), "#version 330 core\n#pragma incg_include \"common.glsl\"\n");

  let mut backend = Recorder::default();
  let source = ProgramSource::glsl(vec![
    (StageType::VertexShader, dir.join("one/a.vert")),
    (StageType::FragmentShader, dir.join("two/a.frag")),
  ]);

  let mut by_name = ShaderLoader::new();
  by_name.declare(&mut backend, "a", source.clone()).unwrap();
  assert_eq!(by_name.files().len(), 3);
  assert!(!by_name.requires_reload());

  let mut by_path = ShaderLoader::with_file_key(FileKey::FullPath);
  by_path.declare(&mut backend, "a", source).unwrap();
  assert_eq!(by_path.files().len(), 4);
}

#[test]
fn missing_file_aborts_only_its_program() {
  let dir = scratch("missing");
  setup(&dir, &["p", "q"]);

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::new();
  let p = loader.declare(&mut backend, "P", program(&dir, "p")).unwrap();
  let q = loader.declare(&mut backend, "Q", program(&dir, "q")).unwrap();

  std::fs::remove_file(dir.join("q.frag")).unwrap();
  touch(&dir.join("common.glsl"));

  let failures = loader.reload_all(&mut backend);

  assert_eq!(loader.handle("Q"), Some(q));
  assert_ne!(loader.handle("P"), Some(p));
  assert_eq!(failures.len(), 1);
  assert_eq!(failures[0].name, "Q");

  match failures[0].error {
    BuildError::FileNotFound { ref path, .. } => assert_eq!(path, &dir.join("q.frag")),
    ref e => panic!("expected a missing file, got {:?}", e),
  }

  assert_eq!(backend.stages_alive.get(), 0);
  assert_eq!(backend.programs_alive.get(), 2);
  assert!(!loader.requires_reload());
}

#[test]
fn full_path_include_created_after_a_failed_reload() {
  let dir = scratch("late-include");
  setup(&dir, &["a"]);

  // not canonical, so that the path as written and the canonical one differ
  let src = dir.join(".");

  let mut backend = Recorder::default();
  let mut loader = ShaderLoader::with_file_key(FileKey::FullPath);
  let before = loader.declare(&mut backend, "a", program(&src, "a")).unwrap();

  write(
    &dir.join("a.vert"),
    "#version 330 core\n#pragma incg_include \"common.glsl\"\n#pragma incg_include \"new.glsl\"\n",
  );
  assert!(loader.requires_reload());

  let failures = loader.reload_all(&mut backend);
  assert_eq!(failures.len(), 1);
  match failures[0].error {
    BuildError::FileNotFound { ref path, .. } => assert_eq!(path, &src.join("new.glsl")),
    ref e => panic!("expected a missing file, got {:?}", e),
  }
  assert_eq!(loader.handle("a"), Some(before));
  assert!(!loader.requires_reload());

  write(&dir.join("new.glsl"), "uniform float t;\n");
  assert!(loader.requires_reload());

  assert!(loader.reload_all(&mut backend).is_empty());
  assert_ne!(loader.handle("a"), Some(before));
  assert_eq!(loader.files().len(), 4);

  for _ in 0..3 {
    assert!(!loader.requires_reload());
  }
}
