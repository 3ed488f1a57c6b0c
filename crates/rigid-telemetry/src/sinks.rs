//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them
//! (capture in memory, forward to `tracing`, ...).

use std::sync::{Arc, Mutex};

use crate::events::{EventKind, SolverEvent};

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SolverEvent);

    /// Called when the session ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Shared view of the events captured by a [`VecSink`].
pub type EventLog = Arc<Mutex<Vec<SolverEvent>>>;

/// A sink that records events in memory for testing and inspection.
///
/// The sink is moved into a bus; keep the [`EventLog`] from [`VecSink::log`]
/// to read the events afterwards.
#[derive(Debug, Default)]
pub struct VecSink {
    events: EventLog,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the captured events.
    pub fn log(&self) -> EventLog {
        Arc::clone(&self.events)
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SolverEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that forwards events to the `tracing` crate.
///
/// Per-iteration events go to `trace`; lifecycle events go to `level`.
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(tracing::Level::DEBUG)
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SolverEvent) {
        if matches!(event.kind, EventKind::SolverIteration { .. }) {
            tracing::trace!(step = event.step, event = ?event.kind, "solver_event");
            return;
        }
        let level = self.level;
        if level == tracing::Level::ERROR {
            tracing::error!(step = event.step, event = ?event.kind, "solver_event");
        } else if level == tracing::Level::WARN {
            tracing::warn!(step = event.step, event = ?event.kind, "solver_event");
        } else if level == tracing::Level::INFO {
            tracing::info!(step = event.step, event = ?event.kind, "solver_event");
        } else if level == tracing::Level::DEBUG {
            tracing::debug!(step = event.step, event = ?event.kind, "solver_event");
        } else {
            tracing::trace!(step = event.step, event = ?event.kind, "solver_event");
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
