//! Inertia term for the dynamics mode.
//!
//! Keeps the two previous frames and extrapolates
//! `y = 2·p_prev − p_prevprev + h²·a_ext`. The global step is pulled towards
//! `y` with weight `inertia · M_i`, where `M` is the lumped vertex mass.

use rigid_math::DVec3;

use crate::config::DynamicsConfig;
use crate::partition::ConstraintPartition;

/// Position history window plus the mass weights of the inertia term.
#[derive(Debug, Clone)]
pub struct DynamicsState {
    config: DynamicsConfig,
    /// `inertia · M_i` per vertex.
    weights: Vec<f64>,
    previous: Vec<DVec3>,
    previous_previous: Vec<DVec3>,
}

impl DynamicsState {
    /// Starts at rest: both history frames equal the rest pose.
    pub fn new(config: DynamicsConfig, mass: &[f64], rest: &[DVec3]) -> Self {
        let weights = mass.iter().map(|m| m * config.inertia).collect();
        Self {
            config,
            weights,
            previous: rest.to_vec(),
            previous_previous: rest.to_vec(),
        }
    }

    /// Diagonal added to `K`, one entry per vertex.
    pub fn diagonal(&self) -> &[f64] {
        &self.weights
    }

    /// Extrapolated position of vertex `v`.
    pub fn predicted(&self, v: usize) -> DVec3 {
        let h = self.config.time_step;
        let accel = DVec3::from_array(self.config.external_acceleration);
        2.0 * self.previous[v] - self.previous_previous[v] + accel * (h * h)
    }

    /// Right-hand side contribution `inertia · M_i · y_i` for every free vertex.
    pub fn inertia_term(&self, partition: &ConstraintPartition) -> Vec<DVec3> {
        partition
            .free
            .iter()
            .map(|&v| self.predicted(v) * self.weights[v])
            .collect()
    }

    /// Shifts the history window by one frame.
    pub fn advance(&mut self, current: &[DVec3]) {
        std::mem::swap(&mut self.previous, &mut self.previous_previous);
        self.previous.copy_from_slice(current);
    }
}
