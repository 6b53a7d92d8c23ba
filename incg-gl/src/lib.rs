//! OpenGL backend for incg.
//!
//! This crate implements the [`incg::backend::shader::Shader`] trait on top of OpenGL, so that the
//! incg shader loader can compile, link and hot-swap real programs, and provides the RAII GPU
//! resources the framework renders with: textures, framebuffers, meshes and timer queries. Every
//! resource deletes its native object when dropped.
//!
//! The backend type is [`GL33`]. Despite its name, it also drives SPIR-V and program binaries when
//! the context is recent enough to support them.

#![deny(missing_docs)]

pub mod gl33;

pub use gl33::GL33;
