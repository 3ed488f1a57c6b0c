//! Solver configuration.
//!
//! Parameters that control solver behavior: iteration counts, the optional
//! early-exit tolerance, the degeneracy threshold and the dynamics term.
//! Configs are plain serde structs and can be loaded from TOML.

use serde::{Deserialize, Serialize};

use rigid_types::constants::{
    DEFAULT_ARAP_ITERATIONS, DEFAULT_DT, DEFAULT_INERTIA, DEGENERATE_THRESHOLD,
    HIGH_QUALITY_ARAP_ITERATIONS, INTERACTIVE_ARAP_ITERATIONS,
};
use rigid_types::{RigidError, RigidResult};

/// Configuration for an ARAP session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArapConfig {
    /// Local/global rounds per step (≥ 1).
    pub max_iterations: u32,

    /// Relative positional change below which a step stops early.
    /// `0.0` disables the early exit; every step then runs `max_iterations`.
    pub tolerance: f64,

    /// Relative degeneracy cutoff for triangles and cells. Both tests are
    /// independent of the mesh scale.
    pub degenerate_threshold: f64,

    /// Fit cell rotations on the rayon thread pool.
    pub parallel: bool,

    /// Inertia term; `None` solves pure static ARAP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamics: Option<DynamicsConfig>,
}

/// Parameters of the inertia term blended into the global step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    /// Weight of the lumped mass matrix relative to the rigidity term.
    pub inertia: f64,

    /// Frame duration used to scale the external acceleration (seconds).
    pub time_step: f64,

    /// Constant acceleration applied to free vertices (e.g. gravity).
    pub external_acceleration: [f64; 3],
}

impl Default for ArapConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_ARAP_ITERATIONS,
            tolerance: 0.0,
            degenerate_threshold: DEGENERATE_THRESHOLD,
            parallel: true,
            dynamics: None,
        }
    }
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            inertia: DEFAULT_INERTIA,
            time_step: DEFAULT_DT,
            external_acceleration: [0.0; 3],
        }
    }
}

impl ArapConfig {
    /// Creates a config with the given iteration count and defaults otherwise.
    pub fn with_iterations(max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..Default::default()
        }
    }

    /// A config for hosts that step once per frame (few iterations).
    pub fn interactive() -> Self {
        Self {
            max_iterations: INTERACTIVE_ARAP_ITERATIONS,
            ..Default::default()
        }
    }

    /// A high-quality config (many iterations, stops once positions settle).
    pub fn high_quality() -> Self {
        Self {
            max_iterations: HIGH_QUALITY_ARAP_ITERATIONS,
            tolerance: 1e-10,
            ..Default::default()
        }
    }

    /// Default iterations with the inertia term switched on.
    pub fn with_dynamics(dynamics: DynamicsConfig) -> Self {
        Self {
            dynamics: Some(dynamics),
            ..Default::default()
        }
    }

    /// Checks every field, returning [`RigidError::InvalidConfig`] on the first bad one.
    pub fn validate(&self) -> RigidResult<()> {
        if self.max_iterations == 0 {
            return Err(RigidError::InvalidConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(RigidError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !self.degenerate_threshold.is_finite() || self.degenerate_threshold < 0.0 {
            return Err(RigidError::InvalidConfig(format!(
                "degenerate_threshold must be finite and non-negative, got {}",
                self.degenerate_threshold
            )));
        }
        if let Some(dynamics) = &self.dynamics {
            dynamics.validate()?;
        }
        Ok(())
    }

    /// Parses a config from TOML. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> RigidResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| RigidError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to TOML.
    pub fn to_toml_string(&self) -> RigidResult<String> {
        toml::to_string(self).map_err(|e| RigidError::Serialization(e.to_string()))
    }
}

impl DynamicsConfig {
    /// Checks the inertia weight and timestep.
    pub fn validate(&self) -> RigidResult<()> {
        if !self.inertia.is_finite() || self.inertia <= 0.0 {
            return Err(RigidError::InvalidConfig(format!(
                "dynamics.inertia must be positive, got {}",
                self.inertia
            )));
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(RigidError::InvalidConfig(format!(
                "dynamics.time_step must be positive, got {}",
                self.time_step
            )));
        }
        if self.external_acceleration.iter().any(|a| !a.is_finite()) {
            return Err(RigidError::InvalidConfig(
                "dynamics.external_acceleration must be finite".into(),
            ));
        }
        Ok(())
    }
}
