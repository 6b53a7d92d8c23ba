//! Window events, as seen by the framework.

use glfw::{Action, Key, WindowEvent};

/// Mouse buttons the framework reacts to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MouseButton {
  /// Left button.
  Left,
  /// Right button.
  Right,
  /// Middle button.
  Middle,
}

/// A type used to pass “inputs” to the framework and applications.
#[derive(Clone, Debug, PartialEq)]
pub enum InputAction {
  /// Quit the application.
  Quit,

  /// Move the camera forward.
  Forward,

  /// Move the camera backward.
  Backward,

  /// Move the camera left.
  Left,

  /// Move the camera right.
  Right,

  /// Rebuild every shader program, changed on disk or not.
  ReloadShaders,

  /// Print the camera.
  LogCamera,

  /// Any other key, forwarded to the application.
  KeyPressed(Key),

  /// A mouse button got pressed.
  ButtonPressed(MouseButton),

  /// A mouse button got released.
  ButtonReleased(MouseButton),

  /// Cursor moved.
  CursorMoved {
    /// Horizontal position, in screen coordinates.
    x: f64,
    /// Vertical position, in screen coordinates.
    y: f64,
  },

  /// Framebuffer size changed.
  Resized {
    /// New width.
    width: u32,
    /// New height.
    height: u32,
  },

  /// Vertical scroll.
  VScroll {
    /// Positive when scrolling up.
    amount: f64,
  },
}

/// Turn a GLFW event into an action, if it maps to any.
pub fn adapt_events(event: WindowEvent) -> Option<InputAction> {
  match event {
    WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Release, _) => {
      Some(InputAction::Quit)
    }

    WindowEvent::Key(key, _, Action::Press, _) | WindowEvent::Key(key, _, Action::Repeat, _) => {
      log::debug!("key press: {:?}", key);
      match key {
        Key::W => Some(InputAction::Forward),
        Key::S => Some(InputAction::Backward),
        Key::A => Some(InputAction::Left),
        Key::D => Some(InputAction::Right),
        Key::R => Some(InputAction::ReloadShaders),
        Key::C => Some(InputAction::LogCamera),
        Key::Escape => None,
        key => Some(InputAction::KeyPressed(key)),
      }
    }

    WindowEvent::MouseButton(button, action, _) => {
      let button = match button {
        glfw::MouseButton::Button1 => MouseButton::Left,
        glfw::MouseButton::Button2 => MouseButton::Right,
        glfw::MouseButton::Button3 => MouseButton::Middle,
        _ => return None,
      };

      match action {
        Action::Press => Some(InputAction::ButtonPressed(button)),
        Action::Release => Some(InputAction::ButtonReleased(button)),
        _ => None,
      }
    }

    WindowEvent::CursorPos(x, y) => Some(InputAction::CursorMoved { x, y }),

    WindowEvent::FramebufferSize(width, height) => Some(InputAction::Resized {
      width: width.max(0) as _,
      height: height.max(0) as _,
    }),

    WindowEvent::Scroll(_, amount) => Some(InputAction::VScroll { amount }),

    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glfw::Modifiers;

  fn key(key: Key, action: Action) -> WindowEvent {
    WindowEvent::Key(key, 0, action, Modifiers::empty())
  }

  #[test]
  fn quitting() {
    assert_eq!(adapt_events(WindowEvent::Close), Some(InputAction::Quit));
    assert_eq!(
      adapt_events(key(Key::Escape, Action::Release)),
      Some(InputAction::Quit)
    );
    assert_eq!(adapt_events(key(Key::Escape, Action::Press)), None);
  }

  #[test]
  fn framework_keys() {
    assert_eq!(
      adapt_events(key(Key::W, Action::Press)),
      Some(InputAction::Forward)
    );
    assert_eq!(
      adapt_events(key(Key::D, Action::Repeat)),
      Some(InputAction::Right)
    );
    assert_eq!(
      adapt_events(key(Key::R, Action::Press)),
      Some(InputAction::ReloadShaders)
    );
    assert_eq!(adapt_events(key(Key::W, Action::Release)), None);
  }

  #[test]
  fn other_keys_are_forwarded() {
    assert_eq!(
      adapt_events(key(Key::Num1, Action::Press)),
      Some(InputAction::KeyPressed(Key::Num1))
    );
    assert_eq!(
      adapt_events(key(Key::Up, Action::Repeat)),
      Some(InputAction::KeyPressed(Key::Up))
    );
  }

  #[test]
  fn mouse() {
    assert_eq!(
      adapt_events(WindowEvent::MouseButton(
        glfw::MouseButton::Button2,
        Action::Press,
        Modifiers::empty()
      )),
      Some(InputAction::ButtonPressed(MouseButton::Right))
    );
    assert_eq!(
      adapt_events(WindowEvent::MouseButton(
        glfw::MouseButton::Button5,
        Action::Press,
        Modifiers::empty()
      )),
      None
    );
    assert_eq!(
      adapt_events(WindowEvent::Scroll(0., -1.)),
      Some(InputAction::VScroll { amount: -1. })
    );
    assert_eq!(
      adapt_events(WindowEvent::FramebufferSize(-1, 600)),
      Some(InputAction::Resized {
        width: 0,
        height: 600
      })
    );
  }
}
