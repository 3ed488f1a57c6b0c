//! # rigid-types
//!
//! Shared types, identifiers, error types, and numeric constants
//! for the rigid deformation engine.
//!
//! This crate has zero domain logic: it defines the vocabulary
//! that all other `rigid-*` crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{ErrorKind, RigidError, RigidResult};
pub use ids::{HandleGroupId, TriangleId, VertexId};
