//! Boundary contract types.
//!
//! These types define the I/O boundary of the deformation engine. They are
//! serializable for API transport and CLI files. Buffers are flat and
//! row-major: `[x0, y0, z0, x1, ...]` for points and `[a0, b0, c0, a1, ...]`
//! for triangles.

use serde::{Deserialize, Serialize};

use rigid_solver::config::{ArapConfig, DynamicsConfig};
use rigid_solver::StepResult;
use rigid_types::{ErrorKind, RigidError};

/// Everything needed to create a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Rest pose, 3 doubles per vertex.
    pub positions: Vec<f64>,
    /// Triangle indices, 3 per triangle.
    pub triangles: Vec<i32>,
    /// Handle vertex indices, no duplicates.
    pub constraints: Vec<i32>,
    /// Local/global rounds per step.
    pub iterations: u32,
    /// Optional inertia term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamics: Option<DynamicsConfig>,
}

impl CreateRequest {
    /// The session config this request describes.
    pub fn config(&self) -> ArapConfig {
        ArapConfig {
            max_iterations: self.iterations,
            dynamics: self.dynamics.clone(),
            ..Default::default()
        }
    }
}

/// Handle targets for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRequest {
    /// Session handle returned at creation.
    pub handle: u64,
    /// Targets, 3 doubles per handle, in creation order.
    pub targets: Vec<f64>,
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResponse {
    /// Session handle.
    pub handle: u64,
    /// Updated positions, 3 doubles per vertex, rest-pose order.
    pub positions: Vec<f64>,
    /// Rounds performed.
    pub iterations: u32,
    /// ARAP energy of the returned positions.
    pub energy: f64,
    /// Whether the early exit fired.
    pub converged: bool,
}

impl StepResponse {
    /// Builds a response from a solver result and flattened positions.
    pub fn new(handle: u64, positions: Vec<f64>, result: &StepResult) -> Self {
        Self {
            handle,
            positions,
            iterations: result.iterations,
            energy: result.energy,
            converged: result.converged,
        }
    }
}

/// Serializable error description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable error category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl From<&RigidError> for ErrorReport {
    fn from(err: &RigidError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
