//! Mutable per-session solver state.
//!
//! This is the primary mutable data structure of a session. Each step
//! reads and rewrites these buffers in place.

use rigid_math::{DMat3, DVec3};

/// Current solution, fitted rotations and the frame counter.
#[derive(Debug, Clone)]
pub struct SolverState {
    /// Current position of every vertex; starts at the rest pose.
    pub positions: Vec<DVec3>,
    /// Rotation used by the last global step, one per cell.
    pub rotations: Vec<DMat3>,
    /// Completed steps.
    pub frame: u64,
}

impl SolverState {
    /// State at the rest pose with identity rotations.
    pub fn at_rest(rest: &[DVec3]) -> Self {
        Self {
            positions: rest.to_vec(),
            rotations: vec![DMat3::IDENTITY; rest.len()],
            frame: 0,
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Relative change between `previous` and the current positions:
    /// `‖p_new − p_old‖ / ‖p_old‖`, or the absolute change near the origin.
    pub fn relative_change(&self, previous: &[DVec3]) -> f64 {
        let mut diff_sq = 0.0;
        let mut norm_sq = 0.0;
        for (new, old) in self.positions.iter().zip(previous) {
            diff_sq += (*new - *old).length_squared();
            norm_sq += old.length_squared();
        }
        if norm_sq > 1e-12 {
            (diff_sq / norm_sq).sqrt()
        } else {
            diff_sq.sqrt()
        }
    }
}
