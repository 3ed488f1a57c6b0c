//! # rigid-telemetry
//!
//! Event bus for solver telemetry. Sessions emit structured events
//! (creation, per-iteration energy, degenerate cells, convergence,
//! disposal) that pluggable sinks consume: in-memory capture for tests
//! and tooling, or forwarding to `tracing`.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SolverEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
