//! Key-driven settings of the assignment.

use incg_app::Key;
use std::f32::consts::TAU;

/// Shader programs, one per exercise.
pub const SHADERS: [&str; 3] = ["shaderA", "shaderB", "shaderC"];

/// Environment map images, in `data/`.
pub const ENV_MAPS: [&str; 2] = ["waterfall.png", "panorama.png"];

/// Displayed objects: name (`data/<name>.obj`) and scale.
pub const OBJECTS: [(&str, f32); 3] = [("sphere", 1.), ("teapot", 2.), ("bunny", 0.1)];

const ROTATION_STEP: f32 = 0.05;
const ROUGHNESS_STEP: f32 = 0.005;
const MAX_ROUGHNESS: f32 = 0.1;
const MAX_GLOSSY_RAYS: i32 = 128;

/// What a key press changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Change {
  /// Nothing.
  None,
  /// Settings that take effect on the next frame.
  Settings,
  /// Another environment map must be loaded.
  EnvMap,
  /// Frame times display mode.
  FrameTimeDisplay,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
  pub shader: usize,
  pub env_map: usize,
  pub object: usize,
  pub debug_uv: bool,
  pub object_rotation: f32,
  pub glossy_rays: i32,
  pub roughness: f32,
}

impl Default for Settings {
  fn default() -> Self {
    Settings {
      shader: 0,
      env_map: 0,
      object: 0,
      debug_uv: false,
      object_rotation: 0.,
      glossy_rays: 16,
      roughness: 0.,
    }
  }
}

impl Settings {
  /// Panoramas are mapped on a cylinder, other images on a sphere.
  pub fn cylindric_mapping(&self) -> bool {
    self.env_map == 1
  }

  /// Whether the glossy reflection parameters are in use.
  pub fn glossy(&self) -> bool {
    self.shader == 2
  }

  pub fn shader_name(&self) -> &'static str {
    SHADERS[self.shader]
  }

  pub fn apply(&mut self, key: Key) -> Change {
    match key {
      Key::Num1 | Key::Kp1 => self.shader = 0,
      Key::Num2 | Key::Kp2 => self.shader = 1,
      Key::Num3 | Key::Kp3 => self.shader = 2,

      Key::O => self.object = (self.object + 1) % OBJECTS.len(),

      Key::E => {
        self.env_map = (self.env_map + 1) % ENV_MAPS.len();
        return Change::EnvMap;
      }

      Key::U => self.debug_uv = !self.debug_uv,

      Key::Left => self.object_rotation = (self.object_rotation - ROTATION_STEP).rem_euclid(TAU),
      Key::Right => self.object_rotation = (self.object_rotation + ROTATION_STEP).rem_euclid(TAU),

      Key::Up => self.roughness = (self.roughness + ROUGHNESS_STEP).min(MAX_ROUGHNESS),
      Key::Down => self.roughness = (self.roughness - ROUGHNESS_STEP).max(0.),

      Key::Equal | Key::KpAdd => self.glossy_rays = (self.glossy_rays * 2).min(MAX_GLOSSY_RAYS),
      Key::Minus | Key::KpSubtract => self.glossy_rays = (self.glossy_rays / 2).max(1),

      Key::F => return Change::FrameTimeDisplay,

      _ => return Change::None,
    }

    Change::Settings
  }

  pub fn panel(&self) -> String {
    let mut panel = format!(
      "{} | {} | {} | rotation {:.2}",
      self.shader_name(),
      OBJECTS[self.object].0,
      ENV_MAPS[self.env_map],
      self.object_rotation
    );

    if self.debug_uv {
      panel.push_str(" | debugUV");
    }

    if self.glossy() {
      panel.push_str(&format!(
        " | roughness {:.3} | glossyRays {}",
        self.roughness, self.glossy_rays
      ));
    }

    panel
  }
}
