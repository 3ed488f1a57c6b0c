//! Stateful deformer driven by handle groups.
//!
//! Sessions are tied to one handle vertex set. The deformer hides that: it
//! owns the rest mesh and a [`HandleSet`], and rebuilds its session lazily on
//! the first step after the set of handle vertices changed. Moving a group
//! (changing its transform) only changes the targets and reuses the session.

use rigid_math::{DAffine3, DVec3};
use rigid_mesh::TriangleMesh;
use rigid_types::{HandleGroupId, RigidError, RigidResult};

use crate::config::ArapConfig;
use crate::handles::HandleSet;
use crate::session::{ArapSession, StepResult};

/// Handle-driven ARAP deformer with lazy session rebuilds.
#[derive(Debug)]
pub struct Deformer {
    mesh: TriangleMesh,
    rest: Vec<DVec3>,
    config: ArapConfig,
    handles: HandleSet,
    session: Option<ArapSession>,
    /// Handle vertex set changed since the session was built.
    stale: bool,
    positions: Vec<DVec3>,
    last_result: Option<StepResult>,
}

impl Deformer {
    /// Creates a deformer for `mesh` with no handles.
    pub fn new(mesh: TriangleMesh, config: ArapConfig) -> RigidResult<Self> {
        mesh.validate()?;
        config.validate()?;
        let rest = mesh.positions();
        Ok(Self {
            positions: rest.clone(),
            rest,
            mesh,
            config,
            handles: HandleSet::new(),
            session: None,
            stale: true,
            last_result: None,
        })
    }

    /// Adds a handle group. The session is rebuilt on the next step.
    pub fn add_group(&mut self, vertices: &[u32], transform: DAffine3) -> RigidResult<HandleGroupId> {
        let n = self.rest.len();
        if let Some(&v) = vertices.iter().find(|&&v| v as usize >= n) {
            return Err(RigidError::constraint(
                v,
                format!("out of range (vertex count: {n})"),
            ));
        }
        let id = self.handles.add_group_with_transform(vertices, transform)?;
        self.stale = true;
        Ok(id)
    }

    /// Removes a handle group. The session is rebuilt on the next step.
    pub fn remove_group(&mut self, id: HandleGroupId) -> RigidResult<()> {
        self.handles.remove_group(id)?;
        self.stale = true;
        Ok(())
    }

    /// Moves a handle group. Keeps the current session.
    pub fn set_transform(&mut self, id: HandleGroupId, transform: DAffine3) -> RigidResult<()> {
        self.handles.set_transform(id, transform)
    }

    /// Drops every handle and the session, and returns to the rest pose.
    pub fn reset(&mut self) -> RigidResult<()> {
        self.handles.clear();
        self.release_session()?;
        self.positions.copy_from_slice(&self.rest);
        self.last_result = None;
        Ok(())
    }

    /// Solves for the current handle transforms and returns the new positions.
    ///
    /// Without handles the rest pose is returned and no session is built.
    pub fn step(&mut self) -> RigidResult<&[DVec3]> {
        if self.handles.is_empty() {
            self.release_session()?;
            self.positions.copy_from_slice(&self.rest);
            self.last_result = None;
            return Ok(&self.positions);
        }

        if self.stale || self.session.is_none() {
            self.release_session()?;
            let constraints = self.handles.constraint_indices();
            tracing::debug!(handles = constraints.len(), "rebuilding ARAP session");
            self.session = Some(ArapSession::create(
                &self.mesh,
                &constraints,
                self.config.clone(),
            )?);
            self.stale = false;
        }

        let targets = self.handles.targets(&self.rest)?;
        let session = self.session.as_mut().ok_or(RigidError::UseAfterDispose)?;
        let result = session.step(&targets)?;
        self.positions.copy_from_slice(session.positions()?);
        self.last_result = Some(result);
        Ok(&self.positions)
    }

    fn release_session(&mut self) -> RigidResult<()> {
        if let Some(mut session) = self.session.take() {
            session.dispose()?;
        }
        self.stale = true;
        Ok(())
    }

    /// Latest positions (the rest pose before the first step).
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Rest mesh.
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Registered handle groups.
    pub fn handles(&self) -> &HandleSet {
        &self.handles
    }

    /// The live session, if one has been built.
    pub fn session(&self) -> Option<&ArapSession> {
        self.session.as_ref()
    }

    /// Result of the last solving step.
    pub fn last_result(&self) -> Option<&StepResult> {
        self.last_result.as_ref()
    }
}
