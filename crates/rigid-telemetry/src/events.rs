//! Solver event types.
//!
//! Structured events emitted by a deformation session at various points
//! of its lifetime. Events are lightweight value types that carry
//! just enough data to be useful for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// An event emitted by a deformation session.
///
/// Events are tagged with the session's step counter at emission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverEvent {
    /// Number of completed steps when the event was emitted.
    pub step: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Session precomputation finished.
    SessionCreated {
        /// Vertices in the rest mesh.
        vertex_count: u32,
        /// Triangles in the rest mesh.
        triangle_count: u32,
        /// Constrained vertices.
        constrained_count: u32,
        /// Whether the dynamics term is active.
        dynamics: bool,
    },

    /// Step started.
    StepBegin {
        /// Iterations requested for this step.
        max_iterations: u32,
    },

    /// One local/global iteration completed.
    SolverIteration {
        /// Iteration number within the step (0-indexed).
        iteration: u32,
        /// ARAP energy after the global step.
        energy: f64,
        /// Relative position change of this iteration.
        residual: f64,
    },

    /// Local step hit cells with a degenerate covariance.
    DegenerateCells {
        /// Iteration number within the step.
        iteration: u32,
        /// Cells that fell back to the identity rotation.
        count: u32,
    },

    /// Convergence report for the step.
    Convergence {
        /// Total iterations used.
        iterations: u32,
        /// Final residual.
        final_residual: f64,
        /// Whether the early-exit tolerance was reached.
        converged: bool,
    },

    /// Step completed.
    StepEnd {
        /// Wall-clock time for the entire step (seconds).
        wall_time: f64,
        /// Energy of the returned configuration.
        energy: f64,
    },

    /// Session resources released.
    Disposed,
}

impl SolverEvent {
    /// Creates a new event for the given step counter.
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self { step, kind }
    }
}
