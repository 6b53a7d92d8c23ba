//! Keyboard and mouse camera controls.

use crate::input::{InputAction, MouseButton};
use incg::camera::CameraSystem;

const PAN_SPEED: f32 = 0.03;
const DOLLY_SPEED: f32 = 0.1;
const ORBIT_SENSITIVITY: f32 = 0.005;
const FREE_LOOK_SENSITIVITY: f32 = 0.001;
const SCROLL_SPEED_FACTOR: f32 = 0.75;
const SCROLL_ZOOM_FACTOR: f32 = 0.9;

/// Drives a [`CameraSystem`] from input actions.
///
/// - W/S/A/D move by the keyboard speed.
/// - Dragging with the left button yaws and pitches, right button pans, middle button dollies.
/// - Scrolling zooms, and scales the keyboard speed along.
#[derive(Clone, Debug)]
pub struct CameraControl {
  /// Controlled camera.
  pub camera: CameraSystem,
  /// Distance covered by one key press.
  pub speed_keyboard: f32,
  /// Multiplier of mouse rotations and dollies.
  pub speed_mouse: f32,
  left: bool,
  right: bool,
  middle: bool,
  cursor: Option<[f64; 2]>,
}

impl CameraControl {
  /// Control `camera`, with unit speeds.
  pub fn new(camera: CameraSystem) -> Self {
    CameraControl {
      camera,
      speed_keyboard: 1.,
      speed_mouse: 1.,
      left: false,
      right: false,
      middle: false,
      cursor: None,
    }
  }

  /// Whether `button` is held down.
  pub fn is_pressed(&self, button: MouseButton) -> bool {
    match button {
      MouseButton::Left => self.left,
      MouseButton::Right => self.right,
      MouseButton::Middle => self.middle,
    }
  }

  /// React to an action. Returns whether the camera moved.
  pub fn apply(&mut self, action: &InputAction) -> bool {
    match *action {
      InputAction::Forward => self.camera.move_forward(self.speed_keyboard),
      InputAction::Backward => self.camera.move_backward(self.speed_keyboard),
      InputAction::Left => self.camera.move_left(self.speed_keyboard),
      InputAction::Right => self.camera.move_right(self.speed_keyboard),

      InputAction::ButtonPressed(button) => {
        self.set_pressed(button, true);
        return false;
      }

      InputAction::ButtonReleased(button) => {
        self.set_pressed(button, false);
        return false;
      }

      InputAction::CursorMoved { x, y } => return self.drag(x, y),

      InputAction::VScroll { amount } => {
        if amount > 0. {
          self.speed_keyboard /= SCROLL_SPEED_FACTOR;
          self.camera.zoom(1. / SCROLL_ZOOM_FACTOR);
        } else {
          self.speed_keyboard *= SCROLL_SPEED_FACTOR;
          self.camera.zoom(SCROLL_ZOOM_FACTOR);
        }
      }

      _ => return false,
    }

    true
  }

  fn set_pressed(&mut self, button: MouseButton, pressed: bool) {
    match button {
      MouseButton::Left => self.left = pressed,
      MouseButton::Right => self.right = pressed,
      MouseButton::Middle => self.middle = pressed,
    }
  }

  // the cursor position is tracked even when no button is held
  fn drag(&mut self, x: f64, y: f64) -> bool {
    let [px, py] = self.cursor.unwrap_or([x, y]);
    self.cursor = Some([x, y]);

    let dx = (px - x) as f32;
    let dy = (py - y) as f32;

    if self.right {
      self.camera.move_up(-dy * PAN_SPEED);
      self.camera.move_right(dx * PAN_SPEED);
    } else if self.middle {
      self.camera.move_forward(dy * DOLLY_SPEED * self.speed_mouse);
    } else if self.left {
      let factor = if self.camera.use_orbit {
        ORBIT_SENSITIVITY
      } else {
        FREE_LOOK_SENSITIVITY
      };

      self.camera.yaw(dx * factor * self.speed_mouse);
      self.camera.pitch(dy * factor * self.speed_mouse);
    } else {
      return false;
    }

    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cgmath::{InnerSpace, Vector3};

  fn control() -> CameraControl {
    CameraControl::new(CameraSystem::new(Vector3::new(0., 0., 5.)))
  }

  #[test]
  fn keyboard_moves() {
    let mut ctrl = control();

    assert!(ctrl.apply(&InputAction::Forward));
    assert!((ctrl.camera.position - Vector3::new(0., 0., 4.)).magnitude() < 1e-5);

    assert!(ctrl.apply(&InputAction::Right));
    assert!((ctrl.camera.position - Vector3::new(1., 0., 4.)).magnitude() < 1e-5);

    assert!(!ctrl.apply(&InputAction::ReloadShaders));
  }

  #[test]
  fn cursor_without_buttons_only_tracks() {
    let mut ctrl = control();
    let before = ctrl.camera;

    assert!(!ctrl.apply(&InputAction::CursorMoved { x: 10., y: 10. }));
    assert!(!ctrl.apply(&InputAction::CursorMoved { x: 50., y: 30. }));
    assert_eq!(ctrl.camera, before);
  }

  #[test]
  fn right_drag_pans() {
    let mut ctrl = control();
    ctrl.apply(&InputAction::CursorMoved { x: 100., y: 100. });
    ctrl.apply(&InputAction::ButtonPressed(MouseButton::Right));
    assert!(ctrl.is_pressed(MouseButton::Right));

    // dragging 10 pixels to the left pans right
    assert!(ctrl.apply(&InputAction::CursorMoved { x: 90., y: 100. }));
    assert!((ctrl.camera.position - Vector3::new(0.3, 0., 5.)).magnitude() < 1e-5);

    ctrl.apply(&InputAction::ButtonReleased(MouseButton::Right));
    assert!(!ctrl.apply(&InputAction::CursorMoved { x: 0., y: 0. }));
  }

  #[test]
  fn left_drag_orbits() {
    let mut ctrl = control();
    let focus = ctrl.camera.focus();
    ctrl.apply(&InputAction::ButtonPressed(MouseButton::Left));
    ctrl.apply(&InputAction::CursorMoved { x: 0., y: 0. });

    assert!(ctrl.apply(&InputAction::CursorMoved { x: 40., y: 0. }));
    assert!((ctrl.camera.focus() - focus).magnitude() < 1e-4);
    assert!(ctrl.camera.position.x.abs() > 0.1);
  }

  #[test]
  fn scrolling_scales_speed() {
    let mut ctrl = control();
    let radius = ctrl.camera.orbit_radius;

    ctrl.apply(&InputAction::VScroll { amount: 1. });
    assert!((ctrl.speed_keyboard - 1. / 0.75).abs() < 1e-5);
    assert!(ctrl.camera.orbit_radius > radius);

    ctrl.apply(&InputAction::VScroll { amount: -1. });
    ctrl.apply(&InputAction::VScroll { amount: -1. });
    assert!((ctrl.speed_keyboard - 0.75).abs() < 1e-5);
  }
}
