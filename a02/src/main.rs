//! Assignment 02: environment mapping.
//!
//! Run with the directory holding `shader/` and `data/` as argument (defaults to this crate’s
//! directory). Shader files are watched and rebuilt whenever they change.
//!
//! | key     | effect                                      |
//! |---------|---------------------------------------------|
//! | 1, 2, 3 | use shaderA, shaderB or shaderC             |
//! | O       | next object (sphere, teapot, bunny)         |
//! | E       | next environment map                        |
//! | U       | toggle UV debugging                         |
//! | ← / →   | rotate the object                           |
//! | ↑ / ↓   | roughness (shaderC)                         |
//! | + / -   | number of glossy rays (shaderC)             |
//! | F       | frame times in ms or fps                    |

mod assignment;
mod settings;

use assignment::Assignment02;
use incg_app::Opts;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let mut opts = Opts::from_args();

  if opts.resource_path.is_none() {
    opts.resource_path = Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")));
  }

  if let Err(e) = incg_app::run::<Assignment02>(opts) {
    log::error!("{}", e);
    process::exit(1);
  }
}
