//! Solver defaults and numeric thresholds.

/// Default number of local/global rounds per step.
pub const DEFAULT_ARAP_ITERATIONS: u32 = 10;

/// Iteration count used by interactive hosts that drive one step per frame.
pub const INTERACTIVE_ARAP_ITERATIONS: u32 = 4;

/// Iteration cap for offline, high-quality solves.
pub const HIGH_QUALITY_ARAP_ITERATIONS: u32 = 100;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1.0e-12;

/// Scale-free degeneracy cutoff. A triangle whose area is at most this
/// fraction of its summed squared edge lengths contributes no cotangent
/// weight; a cell whose covariance norm is at most this fraction of
/// `Σ |w_ij| |x_i − x_j| |p_i − p_j|` keeps the identity rotation.
pub const DEGENERATE_THRESHOLD: f64 = 1.0e-14;

/// Default inertia factor for the dynamics mode.
pub const DEFAULT_INERTIA: f64 = 1.0;

/// Default dynamics timestep (seconds). 1/30th of a second.
pub const DEFAULT_DT: f64 = 1.0 / 30.0;
