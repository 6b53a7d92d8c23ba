//! Backend interfaces.
//!
//! A backend is a type that knows how to talk to a graphics driver. The rest of the crate never
//! calls into a driver directly: it goes through the traits exposed here, which allows swapping the
//! actual graphics API, and running the whole shader pipeline against a recording backend in tests.

pub mod shader;
