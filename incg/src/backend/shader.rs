//! Shader backend.

use std::error;
use std::fmt;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Tessellation control shader.
  TessellationControlShader,
  /// Tessellation evaluation shader.
  TessellationEvaluationShader,
  /// Geometry shader.
  GeometryShader,
  /// Fragment shader.
  FragmentShader,
  /// Compute shader.
  ComputeShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::TessellationControlShader => f.write_str("tessellation control shader"),
      StageType::TessellationEvaluationShader => f.write_str("tessellation evaluation shader"),
      StageType::GeometryShader => f.write_str("geometry shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
      StageType::ComputeShader => f.write_str("compute shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile. Carries the raw driver log.
  CompilationFailed(StageType, String),
  /// Occurs when you try to create a shader which type is not supported on the current hardware.
  UnsupportedType(StageType),
  /// The driver doesn’t accept pre-compiled stage binaries.
  UnsupportedFormat(StageType),
}

impl StageError {
  /// Occurs when a shader fails to compile.
  pub fn compilation_failed(ty: StageType, reason: impl Into<String>) -> Self {
    StageError::CompilationFailed(ty, reason.into())
  }

  /// Occurs when you try to create a shader which type is not supported on the current hardware.
  pub fn unsupported_type(ty: StageType) -> Self {
    StageError::UnsupportedType(ty)
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
      StageError::UnsupportedType(ty) => write!(f, "unsupported {}", ty),
      StageError::UnsupportedFormat(ty) => write!(f, "no binary format available for {}", ty),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a program can emit when being linked or loaded.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProgramError {
  /// Program link failed. Carries the raw driver log.
  LinkFailed(String),
  /// No program binary format is supported by the driver.
  UnsupportedFormat,
}

impl ProgramError {
  /// Program link failed.
  pub fn link_failed(reason: impl Into<String>) -> Self {
    ProgramError::LinkFailed(reason.into())
  }
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
      ProgramError::UnsupportedFormat => f.write_str("no program binary format available"),
    }
  }
}

impl error::Error for ProgramError {}

/// Shader and program creation.
///
/// Representations are expected to release their native objects when dropped: the shader loader
/// relies on it to get rid of stages once a program is linked, and of the leftovers of a failed
/// build.
///
/// # Unsafety
///
/// Implementors talk to the driver directly and must only be used on the thread owning the
/// graphics context.
pub unsafe trait Shader {
  /// Backend representation of a compiled stage.
  type StageRepr;

  /// Backend representation of a linked program.
  type ProgramRepr;

  /// Compile a stage from its (already flattened) source.
  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError>;

  /// Create a stage from a SPIR-V blob, specialized at `entry_point`.
  unsafe fn new_stage_binary(
    &mut self,
    ty: StageType,
    binary: &[u8],
    entry_point: &str,
  ) -> Result<Self::StageRepr, StageError>;

  /// Link stages into a program.
  ///
  /// On success, the stages are detached from the program and can be dropped right away.
  unsafe fn new_program(
    &mut self,
    stages: &[Self::StageRepr],
  ) -> Result<Self::ProgramRepr, ProgramError>;

  /// Load a whole program from a driver-specific binary blob.
  unsafe fn new_program_binary(&mut self, binary: &[u8])
    -> Result<Self::ProgramRepr, ProgramError>;

  /// Native handle of a program.
  fn program_handle(program: &Self::ProgramRepr) -> u32;
}
