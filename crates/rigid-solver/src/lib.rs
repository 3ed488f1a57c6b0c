//! # rigid-solver
//!
//! As-rigid-as-possible surface deformation: cotangent weights, the
//! reduced Laplacian system, the local/global iteration and the stateful
//! session that keeps all precomputation between frames.
//!
//! ## Key Types
//!
//! - [`ArapSession`]: Create / step / dispose lifecycle for one mesh and handle set
//! - [`ArapConfig`]: Iterations, early exit, degeneracy threshold, dynamics
//! - [`HandleSet`]: Rigidly transformed handle groups flattened into constraints
//! - [`Deformer`]: Handle-driven wrapper that rebuilds its session lazily
//!
//! ## Pipeline
//!
//! ```text
//! create: Topology → CotangentWeights → ConstraintPartition → GlobalSystem (Cholesky)
//! step:   repeat { fit_rotations (local) → GlobalSystem::solve (global) }
//! ```

pub mod config;
pub mod deformer;
pub mod dynamics;
pub mod energy;
pub mod global_step;
pub mod handles;
pub mod local_step;
pub mod partition;
pub mod session;
pub mod state;
pub mod weights;

pub use config::{ArapConfig, DynamicsConfig};
pub use deformer::Deformer;
pub use handles::{HandleGroup, HandleSet};
pub use session::{ArapSession, SessionState, StepResult};
