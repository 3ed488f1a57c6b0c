//! Error types for the rigid deformation engine.
//!
//! All crates return `RigidResult<T>` from fallible operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the deformation engine.
#[derive(Debug, Error)]
pub enum RigidError {
    /// Triangle indices are out of range or a triangle repeats a vertex.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Session creation was attempted without any handle vertex.
    #[error("Constraint set is empty: at least one handle vertex is required")]
    EmptyConstraintSet,

    /// A constraint index is out of range or listed twice.
    #[error("Invalid constraint index {index}: {reason}")]
    InvalidConstraintIndex {
        index: i64,
        reason: String,
    },

    /// The reduced Laplacian could not be factorized.
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// An operation was attempted on a disposed session.
    #[error("Session has been disposed")]
    UseAfterDispose,

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A step-time buffer has the wrong shape.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Fieldless discriminant of [`RigidError`], used for status codes
/// and serialized error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidTopology,
    EmptyConstraintSet,
    InvalidConstraintIndex,
    SingularSystem,
    UseAfterDispose,
    InvalidConfig,
    InvalidInput,
    Io,
    Serialization,
}

impl RigidError {
    /// Returns the error's kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RigidError::InvalidTopology(_) => ErrorKind::InvalidTopology,
            RigidError::EmptyConstraintSet => ErrorKind::EmptyConstraintSet,
            RigidError::InvalidConstraintIndex { .. } => ErrorKind::InvalidConstraintIndex,
            RigidError::SingularSystem(_) => ErrorKind::SingularSystem,
            RigidError::UseAfterDispose => ErrorKind::UseAfterDispose,
            RigidError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            RigidError::InvalidInput(_) => ErrorKind::InvalidInput,
            RigidError::Io(_) => ErrorKind::Io,
            RigidError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Convenience constructor for [`RigidError::InvalidConstraintIndex`].
    pub fn constraint(index: impl Into<i64>, reason: impl Into<String>) -> Self {
        RigidError::InvalidConstraintIndex {
            index: index.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for `Result<T, RigidError>`.
pub type RigidResult<T> = Result<T, RigidError>;
