//! GPU meshes.

use crate::gl33::state::GLState;
use crate::gl33::GL33;
use gl::types::*;
use incg::mesh::MeshData;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::mem;
use std::os::raw::c_void;
use std::ptr::null;
use std::rc::Rc;

/// Vertex attribute location of positions.
pub const POSITION_LOCATION: GLuint = 0;
/// Vertex attribute location of normals.
pub const NORMAL_LOCATION: GLuint = 1;
/// Vertex attribute location of texture coordinates.
pub const UV_LOCATION: GLuint = 2;

/// How indices are assembled into primitives.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Primitive {
  /// One point per index.
  Points,
  /// One line per pair of indices.
  Lines,
  /// One triangle per triplet of indices.
  Triangles,
}

impl Primitive {
  fn to_glenum(self) -> GLenum {
    match self {
      Primitive::Points => gl::POINTS,
      Primitive::Lines => gl::LINES,
      Primitive::Triangles => gl::TRIANGLES,
    }
  }
}

/// Errors that can happen while uploading meshes.
#[non_exhaustive]
#[derive(Debug, Eq, PartialEq)]
pub enum MeshError {
  /// An attribute does not have one value per vertex.
  AttributeSizeMismatch {
    /// Location of the attribute.
    location: GLuint,
    /// Number of vertices.
    expected: usize,
    /// Number of values.
    found: usize,
  },
  /// An index refers to a missing vertex.
  IndexOutOfBounds {
    /// The faulty index.
    index: u32,
    /// Number of vertices.
    vertex_count: usize,
  },
}

impl fmt::Display for MeshError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      MeshError::AttributeSizeMismatch {
        location,
        expected,
        found,
      } => write!(
        f,
        "attribute {} has {} values for {} vertices",
        location, found, expected
      ),
      MeshError::IndexOutOfBounds {
        index,
        vertex_count,
      } => write!(
        f,
        "index {} out of bounds ({} vertices)",
        index, vertex_count
      ),
    }
  }
}

impl error::Error for MeshError {}

// a non-interleaved vertex attribute
struct Attribute {
  location: GLuint,
  components: GLint,
  values: Vec<f32>,
}

fn attributes(data: &MeshData) -> Result<Vec<Attribute>, MeshError> {
  let vertex_count = data.vertex_count();
  let mut attributes = vec![Attribute {
    location: POSITION_LOCATION,
    components: 3,
    values: data.positions.iter().flatten().copied().collect(),
  }];

  let optional: [(GLuint, GLint, usize, Vec<f32>); 2] = [
    (
      NORMAL_LOCATION,
      3,
      data.normals.len(),
      data.normals.iter().flatten().copied().collect(),
    ),
    (
      UV_LOCATION,
      2,
      data.uvs.len(),
      data.uvs.iter().flatten().copied().collect(),
    ),
  ];

  for (location, components, len, values) in optional {
    if len == 0 {
      continue;
    }

    if len != vertex_count {
      return Err(MeshError::AttributeSizeMismatch {
        location,
        expected: vertex_count,
        found: len,
      });
    }

    attributes.push(Attribute {
      location,
      components,
      values,
    });
  }

  if let Some(&index) = data
    .indices
    .iter()
    .find(|&&index| index as usize >= vertex_count)
  {
    return Err(MeshError::IndexOutOfBounds {
      index,
      vertex_count,
    });
  }

  Ok(attributes)
}

/// Indexed geometry living on the GPU.
///
/// The vertex array and its buffers are deleted on drop.
#[derive(Debug)]
pub struct Mesh {
  vao: GLuint,
  buffers: Vec<GLuint>,
  index_count: usize,
  primitive: Primitive,
  state: Rc<RefCell<GLState>>,
}

impl Mesh {
  /// Upload geometry.
  ///
  /// Positions go to location 0, normals to location 1 and texture coordinates to location 2.
  pub fn new(backend: &mut GL33, data: &MeshData, primitive: Primitive) -> Result<Self, MeshError> {
    let attributes = attributes(data)?;
    let mut state = backend.state.borrow_mut();

    unsafe {
      let mut vao: GLuint = 0;
      gl::GenVertexArrays(1, &mut vao);
      state.bind_vertex_array(vao);

      let mut buffers = vec![0; attributes.len() + 1];
      gl::GenBuffers(buffers.len() as GLsizei, buffers.as_mut_ptr());

      for (attribute, &buffer) in attributes.iter().zip(&buffers) {
        state.bind_array_buffer(buffer);
        upload(gl::ARRAY_BUFFER, &attribute.values);

        gl::EnableVertexAttribArray(attribute.location);
        gl::VertexAttribPointer(
          attribute.location,
          attribute.components,
          gl::FLOAT,
          gl::FALSE,
          0,
          null(),
        );
      }

      // the element buffer binding is part of the vertex array
      let index_buffer = buffers[attributes.len()];
      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, index_buffer);
      upload(gl::ELEMENT_ARRAY_BUFFER, &data.indices);

      state.bind_vertex_array(0);

      Ok(Mesh {
        vao,
        buffers,
        index_count: data.indices.len(),
        primitive,
        state: backend.state.clone(),
      })
    }
  }

  /// Upload triangles.
  pub fn triangles(backend: &mut GL33, data: &MeshData) -> Result<Self, MeshError> {
    Self::new(backend, data, Primitive::Triangles)
  }

  /// Number of indices.
  pub fn index_count(&self) -> usize {
    self.index_count
  }

  pub(crate) fn vao(&self) -> GLuint {
    self.vao
  }

  // the vertex array must be bound
  pub(crate) unsafe fn draw_elements(&self) {
    if self.index_count > 0 {
      gl::DrawElements(
        self.primitive.to_glenum(),
        self.index_count as GLsizei,
        gl::UNSIGNED_INT,
        null(),
      );
    }
  }
}

impl Drop for Mesh {
  fn drop(&mut self) {
    let mut state = self.state.borrow_mut();
    state.forget_vertex_array(self.vao);

    for &buffer in &self.buffers {
      state.forget_array_buffer(buffer);
    }

    unsafe {
      gl::DeleteVertexArrays(1, &self.vao);
      gl::DeleteBuffers(self.buffers.len() as GLsizei, self.buffers.as_ptr());
    }
  }
}

unsafe fn upload<T>(target: GLenum, values: &[T]) {
  gl::BufferData(
    target,
    (values.len() * mem::size_of::<T>()) as GLsizeiptr,
    values.as_ptr() as *const c_void,
    gl::STATIC_DRAW,
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn attribute_layout() {
    let sphere = attributes(&MeshData::solid_sphere(1., 4, 8)).unwrap();
    let locations = sphere.iter().map(|a| a.location).collect::<Vec<_>>();

    assert_eq!(locations, vec![POSITION_LOCATION, NORMAL_LOCATION, UV_LOCATION]);
    assert_eq!(sphere[0].values.len(), 5 * 9 * 3);
    assert_eq!(sphere[2].values.len(), 5 * 9 * 2);

    let quad = attributes(&MeshData::quad()).unwrap();
    let locations = quad.iter().map(|a| a.location).collect::<Vec<_>>();
    assert_eq!(locations, vec![POSITION_LOCATION, UV_LOCATION]);
  }

  #[test]
  fn inconsistent_meshes() {
    let mut mesh = MeshData::quad();
    mesh.uvs.pop();

    assert!(matches!(
      attributes(&mesh),
      Err(MeshError::AttributeSizeMismatch {
        location: UV_LOCATION,
        expected: 4,
        found: 3
      })
    ));

    let mut mesh = MeshData::quad();
    mesh.indices.push(4);

    assert!(matches!(
      attributes(&mesh),
      Err(MeshError::IndexOutOfBounds {
        index: 4,
        vertex_count: 4
      })
    ));
  }
}
