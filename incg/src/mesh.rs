//! CPU-side geometry.
//!
//! Meshes are indexed triangle lists. Attribute locations are fixed:
//!
//! - `0`: position;
//! - `1`: normal, if any;
//! - `2`: texture coordinates, if any.

use log::info;
use std::collections::HashMap;
use std::error;
use std::f32::consts::PI;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use wavefront_obj::obj;

/// Indexed triangle geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
  /// Vertex positions.
  pub positions: Vec<[f32; 3]>,
  /// Vertex normals; empty or as long as `positions`.
  pub normals: Vec<[f32; 3]>,
  /// Vertex texture coordinates; empty or as long as `positions`.
  pub uvs: Vec<[f32; 2]>,
  /// Triangle list.
  pub indices: Vec<u32>,
}

/// Errors that can happen while loading OBJ models.
#[non_exhaustive]
#[derive(Debug)]
pub enum ObjError {
  /// The file could not be read.
  Io(io::Error),
  /// The file is not valid OBJ.
  Parse {
    /// Line of the error.
    line: usize,
    /// What went wrong.
    message: String,
  },
  /// A face vertex has no normal.
  MissingNormal,
  /// A shape is not a triangle (points and lines are not supported).
  UnsupportedPrimitive,
}

impl fmt::Display for ObjError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ObjError::Io(ref e) => write!(f, "cannot read OBJ file: {}", e),
      ObjError::Parse {
        ref line,
        ref message,
      } => write!(f, "OBJ parse error at line {}: {}", line, message),
      ObjError::MissingNormal => f.write_str("missing normal for a vertex"),
      ObjError::UnsupportedPrimitive => f.write_str("unsupported non-triangle shape"),
    }
  }
}

impl error::Error for ObjError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ObjError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ObjError {
  fn from(e: io::Error) -> Self {
    ObjError::Io(e)
  }
}

impl MeshData {
  /// Number of vertices.
  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  /// Load an OBJ model made of triangles with normals (`f v//vn …`).
  pub fn load_obj(path: impl AsRef<Path>) -> Result<Self, ObjError> {
    let path = path.as_ref();
    let mesh = Self::parse_obj(fs::read_to_string(path)?)?;

    info!(
      "loaded {}: {} vertices, {} triangles",
      path.display(),
      mesh.vertex_count(),
      mesh.indices.len() / 3
    );

    Ok(mesh)
  }

  /// Parse an OBJ model made of triangles with normals.
  ///
  /// Position/normal pairs used by several faces are shared.
  pub fn parse_obj(content: String) -> Result<Self, ObjError> {
    let obj_set = obj::parse(content).map_err(|e| ObjError::Parse {
      line: e.line_number,
      message: e.message,
    })?;

    let mut mesh = MeshData::default();

    for object in &obj_set.objects {
      // remove duplicated vertices by associating each (position, normal) pair with its index
      let mut vertex_cache: HashMap<(usize, usize), u32> = HashMap::new();

      for geometry in &object.geometry {
        for shape in &geometry.shapes {
          let (a, b, c) = match shape.primitive {
            obj::Primitive::Triangle(a, b, c) => (a, b, c),
            _ => return Err(ObjError::UnsupportedPrimitive),
          };

          for &(v, _, n) in &[a, b, c] {
            let n = n.ok_or(ObjError::MissingNormal)?;

            if let Some(&index) = vertex_cache.get(&(v, n)) {
              mesh.indices.push(index);
              continue;
            }

            let p = object.vertices[v];
            let normal = object.normals[n];
            let index = mesh.positions.len() as u32;

            mesh.positions.push([p.x as f32, p.y as f32, p.z as f32]);
            mesh
              .normals
              .push([normal.x as f32, normal.y as f32, normal.z as f32]);
            vertex_cache.insert((v, n), index);
            mesh.indices.push(index);
          }
        }
      }
    }

    Ok(mesh)
  }

  /// Full-screen quad in normalized device coordinates.
  pub fn quad() -> Self {
    MeshData {
      positions: vec![[-1., -1., 0.], [1., -1., 0.], [1., 1., 0.], [-1., 1., 0.]],
      uvs: vec![[0., 0.], [1., 0.], [1., 1.], [0., 1.]],
      indices: vec![0, 1, 3, 1, 2, 3],
      ..Self::default()
    }
  }

  /// Horizontal square at `height`, spanning `[-width, width]` on x and z.
  pub fn ground_plane(height: f32, width: f32) -> Self {
    MeshData {
      positions: vec![
        [-width, height, -width],
        [-width, height, width],
        [width, height, width],
        [width, height, -width],
      ],
      normals: vec![[0., 1., 0.]; 4],
      uvs: vec![[0., 0.], [0., 1.], [1., 1.], [1., 0.]],
      indices: vec![0, 1, 3, 1, 2, 3],
    }
  }

  /// Sphere of radius `radius` centered at the origin.
  ///
  /// `rings` splits it from pole to pole, `segments` around the y axis. Texture coordinates follow
  /// an equirectangular mapping, `v = 1` at the top.
  pub fn solid_sphere(radius: f32, rings: u32, segments: u32) -> Self {
    let rings = rings.max(2);
    let segments = segments.max(3);
    let mut mesh = MeshData::default();

    for i in 0..=rings {
      let phi = PI * i as f32 / rings as f32;

      for j in 0..=segments {
        let theta = 2. * PI * j as f32 / segments as f32;
        let n = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];

        mesh.positions.push([radius * n[0], radius * n[1], radius * n[2]]);
        mesh.normals.push(n);
        mesh.uvs.push([
          j as f32 / segments as f32,
          1. - i as f32 / rings as f32,
        ]);
      }
    }

    grid_indices(&mut mesh.indices, rings, segments);
    mesh
  }

  /// Torus around the z axis, of tube radius `r` and ring radius `big_r`.
  pub fn solid_torus(r: f32, big_r: f32, sides: u32, rings: u32) -> Self {
    let sides = sides.max(3);
    let rings = rings.max(3);
    let mut mesh = MeshData::default();

    for i in 0..=rings {
      let theta = 2. * PI * i as f32 / rings as f32;

      for j in 0..=sides {
        let phi = 2. * PI * j as f32 / sides as f32;
        let dist = big_r + r * phi.cos();

        mesh.positions.push([
          theta.cos() * dist,
          -theta.sin() * dist,
          r * phi.sin(),
        ]);
        mesh.normals.push([
          theta.cos() * phi.cos(),
          -theta.sin() * phi.cos(),
          phi.sin(),
        ]);
        mesh.uvs.push([i as f32 / rings as f32, j as f32 / sides as f32]);
      }
    }

    grid_indices(&mut mesh.indices, rings, sides);
    mesh
  }

  /// A single point at the origin.
  pub fn point() -> Self {
    MeshData {
      positions: vec![[0., 0., 0.]],
      indices: vec![0],
      ..Self::default()
    }
  }
}

// two triangles per cell of a (rows + 1) × (columns + 1) vertex grid
fn grid_indices(indices: &mut Vec<u32>, rows: u32, columns: u32) {
  let stride = columns + 1;

  for i in 0..rows {
    for j in 0..columns {
      let a = i * stride + j;
      let b = a + stride;

      indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TWO_TRIANGLES: &str = "o quad
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vn 0 0 1
f 1//1 2//1 3//1
f 1//1 3//1 4//1
";

  fn check_indices(mesh: &MeshData) {
    assert_eq!(mesh.indices.len() % 3, 0);
    assert!(mesh
      .indices
      .iter()
      .all(|&i| (i as usize) < mesh.vertex_count()));
  }

  #[test]
  fn obj_shares_vertices() {
    let mesh = MeshData::parse_obj(TWO_TRIANGLES.to_owned()).unwrap();

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.normals.len(), 4);
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    assert!(mesh.uvs.is_empty());
  }

  #[test]
  fn obj_needs_normals() {
    let obj = "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    match MeshData::parse_obj(obj.to_owned()) {
      Err(ObjError::MissingNormal) => (),
      other => panic!("expected a missing normal, got {:?}", other),
    }
  }

  #[test]
  fn sphere() {
    let mesh = MeshData::solid_sphere(2., 8, 16);

    assert_eq!(mesh.vertex_count(), 9 * 17);
    assert_eq!(mesh.indices.len(), 8 * 16 * 6);
    assert_eq!(mesh.uvs.len(), mesh.vertex_count());
    check_indices(&mesh);

    for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
      let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
      assert!((len - 2.).abs() < 1e-4);
      assert!((p[1] - 2. * n[1]).abs() < 1e-4);
    }
  }

  #[test]
  fn torus_and_shapes() {
    let torus = MeshData::solid_torus(0.2, 1., 12, 24);
    assert_eq!(torus.vertex_count(), 25 * 13);
    check_indices(&torus);

    check_indices(&MeshData::quad());
    check_indices(&MeshData::ground_plane(-1., 10.));
    check_indices(&MeshData::point());
  }
}
