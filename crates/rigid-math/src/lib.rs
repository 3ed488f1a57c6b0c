//! # rigid-math
//!
//! Linear algebra primitives for the rigid deformation engine.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types (`DVec3`, `DMat3`, etc.)
//! - Sparse matrix representation (CSR) and Cholesky solver interface
//! - Best-fit rotation (orthogonal Procrustes via SVD) for the local step

pub mod decomposition;
pub mod faer_solver;
pub mod sparse;

// Re-export glam types as the canonical math types for the engine.
pub use glam::{DAffine3, DMat3, DQuat, DVec3};
