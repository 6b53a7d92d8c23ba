//! Orbit camera and projection.
//!
//! The camera always orbits around a focus point located `orbit_radius` units in front of it.
//! Yawing, pitching and zooming keep that focus point in place.

use cgmath::{perspective, Deg, InnerSpace, Matrix3, Matrix4, Point3, Rad, Vector3, Zero};

/// Reference window width.
pub const DEFAULT_WIDTH: u32 = 1024;
/// Reference window height.
pub const DEFAULT_HEIGHT: u32 = 768;
/// Vertical field of view at the reference aspect ratio, in degrees.
pub const FOV_Y: f32 = 70.;
/// Near clipping plane.
pub const Z_NEAR: f32 = 1.;
/// Far clipping plane.
pub const Z_FAR: f32 = 100.;

/// Camera system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSystem {
  /// Eye position.
  pub position: Vector3<f32>,
  /// Viewing direction.
  pub view_dir: Vector3<f32>,
  /// Right direction.
  pub right_dir: Vector3<f32>,
  /// Up direction.
  pub up_dir: Vector3<f32>,
  /// Whether mouse rotations orbit around the focus point.
  pub use_orbit: bool,
  /// Distance to the focus point.
  pub orbit_radius: f32,
}

impl Default for CameraSystem {
  fn default() -> Self {
    Self::new(Vector3::new(0., 0., 5.))
  }
}

impl CameraSystem {
  /// Camera at `position`, looking at the origin.
  pub fn new(position: Vector3<f32>) -> Self {
    let view_dir = (-position).normalize();
    let up_dir = Vector3::unit_y();

    CameraSystem {
      position,
      view_dir,
      right_dir: view_dir.cross(up_dir).normalize(),
      up_dir,
      use_orbit: true,
      orbit_radius: position.magnitude(),
    }
  }

  /// Camera at `position`, looking along `dir`.
  ///
  /// A zero direction looks at the origin.
  pub fn looking(position: Vector3<f32>, dir: Vector3<f32>, up: Vector3<f32>) -> Self {
    let view_dir = if dir.is_zero() { -position } else { dir };

    CameraSystem {
      position,
      view_dir,
      right_dir: view_dir.cross(up),
      up_dir: Vector3::unit_y(),
      use_orbit: true,
      orbit_radius: position.magnitude(),
    }
  }

  /// Point the camera orbits around.
  pub fn focus(&self) -> Vector3<f32> {
    self.position + self.view_dir.normalize() * self.orbit_radius
  }

  /// Move along the viewing direction.
  pub fn move_forward(&mut self, delta: f32) {
    self.position += self.view_dir * delta;
  }

  /// Move against the viewing direction.
  pub fn move_backward(&mut self, delta: f32) {
    self.move_forward(-delta);
  }

  /// Move up, perpendicular to the viewing direction.
  pub fn move_up(&mut self, delta: f32) {
    self.position += self.right_dir.cross(self.view_dir).normalize() * delta;
  }

  /// Move down, perpendicular to the viewing direction.
  pub fn move_down(&mut self, delta: f32) {
    self.move_up(-delta);
  }

  /// Move along the right direction.
  pub fn move_right(&mut self, delta: f32) {
    self.position += self.right_dir * delta;
  }

  /// Move against the right direction.
  pub fn move_left(&mut self, delta: f32) {
    self.move_right(-delta);
  }

  /// Scale the distance to the focus point.
  pub fn zoom(&mut self, factor: f32) {
    let focus = self.focus();
    self.orbit_radius *= factor;
    self.position = focus - self.view_dir.normalize() * self.orbit_radius;
  }

  /// Rotate around the up direction, keeping the focus point.
  pub fn yaw(&mut self, angle: f32) {
    let focus = self.focus();
    let rot = Matrix3::from_axis_angle(self.up_dir.normalize(), Rad(angle));

    self.view_dir = rot * self.view_dir;
    self.right_dir = rot * self.right_dir;
    self.position = focus - self.view_dir.normalize() * self.orbit_radius;
  }

  /// Rotate around the right direction, keeping the focus point.
  ///
  /// Rotations that would cross the top or bottom pole are ignored.
  pub fn pitch(&mut self, angle: f32) {
    let focus = self.focus();
    let rot = Matrix3::from_axis_angle(self.right_dir.normalize(), Rad(angle));
    let new_dir = rot * self.view_dir;

    if self.up_dir.cross(new_dir).dot(self.up_dir.cross(self.view_dir)) > 0. {
      self.view_dir = new_dir;
    }

    self.position = focus - self.view_dir.normalize() * self.orbit_radius;
  }

  /// Rotate around the viewing direction.
  pub fn roll(&mut self, angle: f32) {
    let rot = Matrix3::from_axis_angle(self.view_dir.normalize(), Rad(angle));

    self.right_dir = rot * self.right_dir;
    self.up_dir = rot * self.up_dir;
  }

  /// Rotate the position around the world y axis and look back at the origin.
  pub fn rotate_around_origin(&mut self, angle: f32) {
    self.position = Matrix3::from_angle_y(Rad(angle)) * self.position;
    self.view_dir = (-self.position).normalize();
    self.right_dir = self.view_dir.cross(self.up_dir).normalize();
  }

  /// World-to-view matrix.
  pub fn view_matrix(&self) -> Matrix4<f32> {
    let eye = Point3::new(self.position.x, self.position.y, self.position.z);
    Matrix4::look_at_rh(eye, eye + self.view_dir, self.up_dir)
  }
}

/// Vertical field of view for a framebuffer, in degrees.
///
/// Horizontal field of view grows with wider framebuffers (hor+). Framebuffers narrower than the
/// reference aspect ratio widen the vertical field of view instead, so that the horizontal one
/// never shrinks.
pub fn hor_plus_fov_y(width: u32, height: u32) -> f32 {
  let aspect_orig = DEFAULT_WIDTH as f32 / DEFAULT_HEIGHT as f32;
  let aspect = aspect_ratio(width, height);

  if aspect < aspect_orig {
    let half = Rad::from(Deg(FOV_Y * 0.5)).0;
    Deg::from(Rad(2. * (half.tan() * aspect_orig / aspect).atan())).0
  } else {
    FOV_Y
  }
}

/// Projection matrix for a framebuffer. Sizes are clamped to at least 1.
pub fn hor_plus_projection(width: u32, height: u32) -> Matrix4<f32> {
  perspective(
    Deg(hor_plus_fov_y(width, height)),
    aspect_ratio(width, height),
    Z_NEAR,
    Z_FAR,
  )
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
  width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
  use super::*;

  fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    (a - b).magnitude() < 1e-4
  }

  #[test]
  fn looks_at_origin() {
    let cam = CameraSystem::new(Vector3::new(1.5, 1.5, 1.5));

    assert!(close(cam.focus(), Vector3::zero()));
    assert!((cam.orbit_radius - 1.5 * 3f32.sqrt()).abs() < 1e-5);
    assert!(cam.right_dir.dot(cam.view_dir).abs() < 1e-5);
  }

  #[test]
  fn orbiting_keeps_focus() {
    let mut cam = CameraSystem::new(Vector3::new(0., 2., 5.));
    let focus = cam.focus();

    cam.yaw(0.7);
    assert!(close(cam.focus(), focus));

    cam.pitch(-0.2);
    assert!(close(cam.focus(), focus));

    cam.zoom(0.9);
    assert!(close(cam.focus(), focus));
    assert!((cam.position - focus).magnitude() < (Vector3::new(0., 2., 5.) - focus).magnitude());
  }

  #[test]
  fn pitch_stops_at_poles() {
    let mut cam = CameraSystem::new(Vector3::new(0., 0., 5.));
    let before = cam.view_dir;

    // 135° up goes past the top
    cam.pitch(std::f32::consts::PI * 0.75);
    assert!(close(cam.view_dir, before));

    cam.pitch(0.3);
    assert!(!close(cam.view_dir, before));
  }

  #[test]
  fn moving_does_not_turn() {
    let mut cam = CameraSystem::new(Vector3::new(0., 0., 5.));
    let dir = cam.view_dir;

    cam.move_forward(1.);
    cam.move_right(2.);
    cam.move_up(0.5);

    assert!(close(cam.view_dir, dir));
    assert!(close(cam.position, Vector3::new(2., 0.5, 4.)));
  }

  #[test]
  fn rotation_around_origin_keeps_distance() {
    let mut cam = CameraSystem::new(Vector3::new(3., 1., 0.));
    cam.rotate_around_origin(1.2);

    assert!((cam.position.magnitude() - Vector3::new(3., 1., 0.).magnitude()).abs() < 1e-5);
    assert!(close(cam.view_dir, (-cam.position).normalize()));
  }

  #[test]
  fn hor_plus() {
    assert_eq!(hor_plus_fov_y(1024, 768), FOV_Y);
    assert_eq!(hor_plus_fov_y(1920, 768), FOV_Y);
    assert!(hor_plus_fov_y(768, 1024) > FOV_Y);
    assert!(hor_plus_fov_y(0, 0).is_finite());
  }
}
