//! # rigid-bench
//!
//! Benchmark suite for the ARAP deformation engine.
//!
//! Provides 3 procedural deformation scenarios, metric collection,
//! and CSV/JSON export for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{HandleMotion, Scenario, ScenarioKind};
