//! # rigid-io
//!
//! The flat-buffer boundary of the deformation engine.
//!
//! Hosts hand over raw numeric buffers (3 doubles per vertex, 3 integers
//! per triangle, one integer per handle). This crate validates and
//! marshals them into solver types, keeps sessions behind opaque `u64`
//! handles, and exposes the same create / step / dispose operations through
//! a C ABI.

pub mod buffers;
pub mod contract;
pub mod ffi;
pub mod registry;
pub mod validator;

pub use contract::{CreateRequest, ErrorReport, StepRequest, StepResponse};
pub use registry::{SessionHandle, SessionRegistry};
