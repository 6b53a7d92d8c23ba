//! The frame loop.

use crate::cli::Opts;
use crate::error::AppError;
use crate::framework::Framework;
use crate::input::{adapt_events, InputAction};
use crate::Application;
use incg_gl::gl33::TimerQuery;
use incg_glfw::GlfwSurface;
use log::info;
use std::thread;
use std::time::{Duration, Instant};

/// Open a window and run an application until it gets closed.
///
/// Every frame:
///
/// 1. Shader programs are rebuilt if one of their files changed (unless watching is disabled).
/// 2. Events are polled and dispatched.
/// 3. The application is updated, then rendered while the GPU time is measured.
/// 4. The window title shows the frame statistics and the application panel.
/// 5. Buffers are swapped, and the thread sleeps to honour the frame rate cap.
///
/// The application is dropped first, then the shader programs, then the context.
pub fn run<A>(opts: Opts) -> Result<(), AppError>
where
  A: Application,
{
  let surface = GlfwSurface::new_gl33(A::TITLE, opts.window_opt())?;
  let events = surface.events_rx;
  let mut framework = Framework::new(surface.context, &opts);

  info!("resources: {}", framework.resource_path().display());

  let mut app = A::bootstrap(&mut framework)?;
  let mut timer = TimerQuery::new();

  let frame_duration = opts.frame_duration();
  let dt = frame_duration.map_or(0., |d| d.as_secs_f32());
  let start_t = Instant::now();
  let mut next_update = Duration::ZERO;

  'app: loop {
    if opts.watch() && framework.shaders_changed() {
      framework.update_shader_programs();
    }

    // handle events
    framework.poll_events();
    for (_, event) in glfw::flush_messages(&events) {
      match adapt_events(event) {
        Some(InputAction::Quit) => break 'app,

        Some(InputAction::KeyPressed(key)) => app.key(&mut framework, key),

        Some(action @ InputAction::Resized { .. }) => {
          framework.process(&action);
          app.resize(&mut framework);
        }

        Some(action) => framework.process(&action),

        None => (),
      }
    }

    if framework.should_close() {
      break 'app;
    }

    app.update(&mut framework, dt);

    timer.begin();
    app.render(&mut framework);
    let ms = timer.end();
    framework.stats.push(ms as f32);

    let panel = app.panel(&framework);
    let title = if panel.is_empty() {
      format!("{} | {}", A::TITLE, framework.stats)
    } else {
      format!("{} | {} | {}", A::TITLE, framework.stats, panel)
    };
    framework.set_title(title);

    framework.swap_buffers();

    if let Some(frame_duration) = frame_duration {
      next_update += frame_duration;

      if let Some(wait) = next_update.checked_sub(start_t.elapsed()) {
        thread::sleep(wait);
      }
    }
  }

  drop(timer);
  drop(app);

  Ok(())
}
