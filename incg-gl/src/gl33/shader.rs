use crate::gl33::state::GLState;
use crate::gl33::GL33;
use gl::{self, types::*};
use incg::backend::shader::{ProgramError, Shader, StageError, StageType};
use log::warn;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr::{null, null_mut};
use std::rc::Rc;

/// A compiled shader stage.
///
/// Stages only live until the program they are linked into is built.
#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
  ty: StageType,
}

impl Stage {
  /// Type of the stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }
}

impl Drop for Stage {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteShader(self.handle);
    }
  }
}

/// A linked shader program.
#[derive(Debug)]
pub struct Program {
  pub(crate) handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Drop for Program {
  fn drop(&mut self) {
    self.state.borrow_mut().forget_program(self.handle);

    unsafe {
      gl::DeleteProgram(self.handle);
    }
  }
}

impl Program {
  /// Native handle of the program.
  pub fn handle(&self) -> GLuint {
    self.handle
  }

  // check the link status of the program, returning the link log on failure
  fn link_status(&self) -> Result<(), ProgramError> {
    let handle = self.handle;

    unsafe {
      let mut linked: GLint = gl::FALSE.into();
      gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

      if linked == gl::TRUE.into() {
        Ok(())
      } else {
        Err(ProgramError::link_failed(program_info_log(handle)))
      }
    }
  }
}

unsafe impl Shader for GL33 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let c_src = CString::new(src.as_bytes())
      .map_err(|_| StageError::compilation_failed(ty, "shader source contains a NUL byte"))?;
    let stage = create_stage(ty)?;

    gl::ShaderSource(stage.handle, 1, [c_src.as_ptr()].as_ptr(), null());
    gl::CompileShader(stage.handle);

    compile_status(stage)
  }

  unsafe fn new_stage_binary(
    &mut self,
    ty: StageType,
    binary: &[u8],
    entry_point: &str,
  ) -> Result<Self::StageRepr, StageError> {
    if !gl::SpecializeShader::is_loaded() {
      warn!("glSpecializeShader is not available, cannot load SPIR-V {}", ty);
      return Err(StageError::UnsupportedFormat(ty));
    }

    if binary.is_empty() {
      return Err(StageError::UnsupportedFormat(ty));
    }

    let c_entry_point = CString::new(entry_point.as_bytes())
      .map_err(|_| StageError::compilation_failed(ty, "entry point contains a NUL byte"))?;
    let stage = create_stage(ty)?;

    gl::ShaderBinary(
      1,
      &stage.handle,
      gl::SHADER_BINARY_FORMAT_SPIR_V,
      binary.as_ptr() as *const c_void,
      binary.len() as GLsizei,
    );
    gl::SpecializeShader(stage.handle, c_entry_point.as_ptr(), 0, null(), null());

    compile_status(stage)
  }

  unsafe fn new_program(
    &mut self,
    stages: &[Self::StageRepr],
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let program = self.create_program()?;

    for stage in stages {
      gl::AttachShader(program.handle, stage.handle);
    }

    // make programs retrievable as binaries
    if gl::ProgramParameteri::is_loaded() {
      gl::ProgramParameteri(
        program.handle,
        gl::PROGRAM_BINARY_RETRIEVABLE_HINT,
        gl::TRUE.into(),
      );
    }

    gl::LinkProgram(program.handle);

    // stages are not needed anymore, whatever the outcome
    for stage in stages {
      gl::DetachShader(program.handle, stage.handle);
    }

    program.link_status().map(move |_| program)
  }

  unsafe fn new_program_binary(&mut self, binary: &[u8]) -> Result<Self::ProgramRepr, ProgramError> {
    if !gl::ProgramBinary::is_loaded() {
      warn!("glProgramBinary is not available, cannot load program binaries");
      return Err(ProgramError::UnsupportedFormat);
    }

    if binary.is_empty() {
      return Err(ProgramError::UnsupportedFormat);
    }

    let mut num_formats: GLint = 0;
    gl::GetIntegerv(gl::NUM_PROGRAM_BINARY_FORMATS, &mut num_formats);

    if num_formats <= 0 {
      warn!("the driver supports no program binary format");
      return Err(ProgramError::UnsupportedFormat);
    }

    let mut formats: Vec<GLint> = vec![0; num_formats as usize];
    gl::GetIntegerv(gl::PROGRAM_BINARY_FORMATS, formats.as_mut_ptr());

    let program = self.create_program()?;

    // use the first format the driver knows about
    gl::ProgramBinary(
      program.handle,
      formats[0] as GLenum,
      binary.as_ptr() as *const c_void,
      binary.len() as GLsizei,
    );

    program.link_status().map(move |_| program)
  }

  fn program_handle(program: &Self::ProgramRepr) -> u32 {
    program.handle
  }
}

impl GL33 {
  unsafe fn create_program(&mut self) -> Result<Program, ProgramError> {
    let handle = gl::CreateProgram();

    if handle == 0 {
      return Err(ProgramError::link_failed("unable to create shader program"));
    }

    Ok(Program {
      handle,
      state: self.state.clone(),
    })
  }
}

unsafe fn create_stage(ty: StageType) -> Result<Stage, StageError> {
  let shader_type = opengl_shader_type(ty).ok_or(StageError::UnsupportedType(ty))?;
  let handle = gl::CreateShader(shader_type);

  if handle == 0 {
    return Err(StageError::compilation_failed(
      ty,
      "unable to create shader stage",
    ));
  }

  Ok(Stage { handle, ty })
}

// check the compilation status of a stage; the stage is dropped (and deleted) on failure
unsafe fn compile_status(stage: Stage) -> Result<Stage, StageError> {
  let mut compiled: GLint = gl::FALSE.into();
  gl::GetShaderiv(stage.handle, gl::COMPILE_STATUS, &mut compiled);

  if compiled == gl::TRUE.into() {
    Ok(stage)
  } else {
    Err(StageError::compilation_failed(
      stage.ty,
      shader_info_log(stage.handle),
    ))
  }
}

unsafe fn shader_info_log(handle: GLuint) -> String {
  let mut log_len: GLint = 0;
  gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

  let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
  gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

  String::from_utf8_lossy(&log).into_owned()
}

unsafe fn program_info_log(handle: GLuint) -> String {
  let mut log_len: GLint = 0;
  gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

  let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
  gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

  String::from_utf8_lossy(&log).into_owned()
}

fn opengl_shader_type(t: StageType) -> Option<GLenum> {
  match t {
    StageType::TessellationControlShader => Some(gl::TESS_CONTROL_SHADER),
    StageType::TessellationEvaluationShader => Some(gl::TESS_EVALUATION_SHADER),
    StageType::VertexShader => Some(gl::VERTEX_SHADER),
    StageType::GeometryShader => Some(gl::GEOMETRY_SHADER),
    StageType::FragmentShader => Some(gl::FRAGMENT_SHADER),
    StageType::ComputeShader if gl::DispatchCompute::is_loaded() => Some(gl::COMPUTE_SHADER),
    StageType::ComputeShader => None,
  }
}
