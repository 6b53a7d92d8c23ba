//! Environment mapping on a few objects.
//!
//! The environment map is drawn on a large sphere around the scene, then one of the objects is
//! drawn on top of it with one of the exercise shaders.

use crate::settings::{Change, Settings, ENV_MAPS, OBJECTS, SHADERS};
use cgmath::{Matrix4, Rad, SquareMatrix as _, Vector3};
use incg::camera::CameraSystem;
use incg::mesh::MeshData;
use incg::shader::{ProgramSource, StageType};
use incg::texels::Texels;
use incg_app::{AppError, Application, Framework, Key};
use incg_gl::gl33::{Mesh, ProgramGuard, Texture, Wrap};
use log::{error, info};

const CLEAR_COLOR: [f32; 4] = [0.2, 0.2, 0.2, 1.];
const ENV_SPHERE_RADIUS: f32 = 60.;
const ENV_SPHERE_RESOLUTION: u32 = 256;
const ENV_MAP_UNIT: u32 = 0;

pub struct Assignment02 {
  settings: Settings,
  env_map: Texture,
  env_sphere: Mesh,
  objects: Vec<Mesh>,
}

impl Assignment02 {
  fn load_env_map(framework: &mut Framework, index: usize) -> Result<Texture, AppError> {
    let texels = Texels::load(framework.resource("data").join(ENV_MAPS[index]))?;
    let texture = Texture::from_texels(framework.backend(), &texels, Wrap::Repeat)?;

    Ok(texture)
  }

  fn set_matrices(program: &mut ProgramGuard, matrices: [Matrix4<f32>; 3]) {
    let [view, projection, model] = matrices;

    program.set("viewMatrix", <[[f32; 4]; 4]>::from(view));
    program.set("projMatrix", <[[f32; 4]; 4]>::from(projection));
    program.set("modelMatrix", <[[f32; 4]; 4]>::from(model));
  }

  fn render_map(&self, framework: &mut Framework) {
    let matrices = [
      framework.view_matrix(),
      framework.projection_matrix(),
      Matrix4::identity(),
    ];

    match framework.shader("map") {
      Ok(mut program) => {
        program.bind_texture(ENV_MAP_UNIT, &self.env_map);
        program.set("envMap", ENV_MAP_UNIT as i32);
        program.set("cylindricMapping", self.settings.cylindric_mapping());
        program.set("debugUV", self.settings.debug_uv);
        Self::set_matrices(&mut program, matrices);

        program.draw(&self.env_sphere);
      }

      Err(e) => error!("{}", e),
    }
  }

  fn render_object(&self, framework: &mut Framework) {
    let (_, scale) = OBJECTS[self.settings.object];
    let model = Matrix4::from_translation(Vector3::new(0., -0.33, 0.))
      * Matrix4::from_angle_y(Rad(self.settings.object_rotation))
      * Matrix4::from_scale(scale);
    let matrices = [framework.view_matrix(), framework.projection_matrix(), model];

    match framework.shader(self.settings.shader_name()) {
      Ok(mut program) => {
        program.bind_texture(ENV_MAP_UNIT, &self.env_map);
        program.set("envMap", ENV_MAP_UNIT as i32);
        program.set("cylindricMapping", self.settings.cylindric_mapping());
        program.set("debugUV", self.settings.debug_uv);
        Self::set_matrices(&mut program, matrices);

        if self.settings.glossy() {
          program.set("glossyRays", self.settings.glossy_rays);
          program.set("roughness", self.settings.roughness);
        }

        program.draw(&self.objects[self.settings.object]);
      }

      Err(e) => error!("{}", e),
    }
  }
}

impl Application for Assignment02 {
  const TITLE: &'static str = "Assignment02";

  fn bootstrap(framework: &mut Framework) -> Result<Self, AppError> {
    framework.set_camera(CameraSystem::new(Vector3::new(1.5, 1.5, 1.5)));

    for name in ["map"].iter().chain(SHADERS.iter()) {
      let shader_dir = framework.resource("shader");
      let source = ProgramSource::glsl([
        (
          StageType::VertexShader,
          shader_dir.join(format!("{}.vs.glsl", name)),
        ),
        (
          StageType::FragmentShader,
          shader_dir.join(format!("{}.fs.glsl", name)),
        ),
      ]);

      framework.initialize_shader(name, source)?;
    }

    let settings = Settings::default();
    let env_map = Self::load_env_map(framework, settings.env_map)?;

    let env_sphere = MeshData::solid_sphere(
      ENV_SPHERE_RADIUS,
      ENV_SPHERE_RESOLUTION,
      ENV_SPHERE_RESOLUTION,
    );
    let env_sphere = Mesh::triangles(framework.backend(), &env_sphere)?;

    let objects = OBJECTS
      .iter()
      .map(|(name, _)| {
        let data = MeshData::load_obj(framework.resource("data").join(format!("{}.obj", name)))?;
        let mesh = Mesh::triangles(framework.backend(), &data)?;
        Ok(mesh)
      })
      .collect::<Result<Vec<_>, AppError>>()?;

    Ok(Assignment02 {
      settings,
      env_map,
      env_sphere,
      objects,
    })
  }

  fn render(&mut self, framework: &mut Framework) {
    framework.backend().clear(CLEAR_COLOR);
    self.render_map(framework);

    // the object always shows in front of the environment
    framework.backend().clear_depth();
    self.render_object(framework);
  }

  fn key(&mut self, framework: &mut Framework, key: Key) {
    let previous_env_map = self.settings.env_map;

    match self.settings.apply(key) {
      Change::EnvMap => match Self::load_env_map(framework, self.settings.env_map) {
        Ok(env_map) => {
          info!("environment map: {}", ENV_MAPS[self.settings.env_map]);
          self.env_map = env_map;
        }

        Err(e) => {
          error!("{}", e);
          self.settings.env_map = previous_env_map;
        }
      },

      Change::FrameTimeDisplay => framework.stats.toggle_display(),

      Change::Settings | Change::None => (),
    }
  }

  fn panel(&self, _: &Framework) -> String {
    self.settings.panel()
  }
}
