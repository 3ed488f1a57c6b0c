//! Opaque session handles.
//!
//! The registry maps `u64` handles to sessions. Each session sits behind its
//! own mutex, so steps on different sessions never contend; the map lock is
//! only held to look a handle up. Handles are never reused, and disposed or
//! unknown handles fail with [`RigidError::UseAfterDispose`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use rigid_solver::{ArapSession, StepResult};
use rigid_types::{RigidError, RigidResult};

use crate::buffers::{points_from_flat, points_to_flat};
use crate::contract::{CreateRequest, StepRequest, StepResponse};
use crate::validator::{build_session, validate_targets};

/// Opaque session handle. Zero is never issued.
pub type SessionHandle = u64;

/// A registered session.
pub type SharedSession = Arc<Mutex<ArapSession>>;

/// Handle → session table.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionHandle, SharedSession>>,
    next_handle: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic mid-step leaves the session in a consistent (if stale) state.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Takes ownership of a ready session and returns its handle.
    pub fn insert(&self, session: ArapSession) -> SessionHandle {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        lock(&self.sessions).insert(handle, Arc::new(Mutex::new(session)));
        tracing::debug!(handle, "session registered");
        handle
    }

    /// Builds a session from a create request and registers it.
    pub fn create(&self, request: &CreateRequest) -> RigidResult<SessionHandle> {
        let session = build_session(request)?;
        Ok(self.insert(session))
    }

    /// Looks up a live session.
    pub fn get(&self, handle: SessionHandle) -> RigidResult<SharedSession> {
        lock(&self.sessions)
            .get(&handle)
            .cloned()
            .ok_or(RigidError::UseAfterDispose)
    }

    /// Steps a session with flat targets and writes flat positions into `out`.
    pub fn step_into(
        &self,
        handle: SessionHandle,
        targets: &[f64],
        out: &mut [f64],
    ) -> RigidResult<StepResult> {
        let shared = self.get(handle)?;
        let mut session = lock(&shared);
        validate_targets(targets, session.constraint_indices()?.len())?;
        let expected = session.vertex_count()? * 3;
        if out.len() != expected {
            return Err(RigidError::InvalidInput(format!(
                "Output buffer holds {} values, expected {expected}",
                out.len()
            )));
        }
        let result = session.step(&points_from_flat(targets)?)?;
        session.write_positions(out)?;
        Ok(result)
    }

    /// Steps a session described by a request.
    pub fn step(&self, request: &StepRequest) -> RigidResult<StepResponse> {
        let shared = self.get(request.handle)?;
        let mut session = lock(&shared);
        validate_targets(&request.targets, session.constraint_indices()?.len())?;
        let result = session.step(&points_from_flat(&request.targets)?)?;
        let positions = points_to_flat(session.positions()?);
        Ok(StepResponse::new(request.handle, positions, &result))
    }

    /// Removes and disposes a session.
    pub fn dispose(&self, handle: SessionHandle) -> RigidResult<()> {
        let shared = lock(&self.sessions)
            .remove(&handle)
            .ok_or(RigidError::UseAfterDispose)?;
        // Waits for an in-flight step on another thread.
        lock(&shared).dispose()?;
        tracing::debug!(handle, "session released");
        Ok(())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    /// Returns true if no session is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: OnceLock<SessionRegistry> = OnceLock::new();

/// Process-wide registry used by the C ABI.
pub fn global() -> &'static SessionRegistry {
    GLOBAL_REGISTRY.get_or_init(SessionRegistry::new)
}
