//! # incg
//!
//! Backend-agnostic core of the incg instructional graphics framework.
//!
//! The most interesting part of this crate is the [`shader`] module: it turns GLSL files that
//! use `#pragma incg_include "file.glsl"` directives into flattened sources annotated with `#line`
//! markers, compiles and links them through a [`backend::shader::Shader`] implementation, rewrites
//! the driver’s diagnostics back into file names and keeps every named program hot-reloadable.
//! A failed rebuild never replaces a program that already works.
//!
//! The rest of the crate is the CPU side of the framework:
//!
//! - [`camera`]: the orbit camera system and the hor+ projection.
//! - [`mesh`]: CPU geometry (OBJ models and procedural shapes).
//! - [`texels`]: image decoding into bottom-left-origin RGBA8 buffers.
//!
//! GPU resources live in backend crates, such as `incg-gl`.

#![deny(missing_docs)]

pub mod backend;
pub mod camera;
pub mod context;
pub mod mesh;
pub mod shader;
pub mod texels;
