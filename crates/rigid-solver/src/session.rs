//! ARAP deformation session.
//!
//! A session owns everything precomputed for one mesh and one handle set:
//! topology, cotangent weights, the factorized reduced system and the
//! mutable solver state. Creation runs the whole precomputation and either
//! returns a ready session or an error; there is no partially built session.
//!
//! ```text
//! create ──► Ready ──step──► Ready ──dispose──► Disposed
//!              ▲               │
//!              └───────────────┘
//! ```
//!
//! Every call on a disposed session fails with [`RigidError::UseAfterDispose`].

use std::time::Instant;

use serde::{Deserialize, Serialize};

use rigid_math::{DMat3, DVec3};
use rigid_mesh::TriangleMesh;
use rigid_mesh::topology::Topology;
use rigid_telemetry::{EventBus, EventKind, SolverEvent};
use rigid_types::{RigidError, RigidResult};

use crate::config::ArapConfig;
use crate::dynamics::DynamicsState;
use crate::energy::arap_energy;
use crate::global_step::GlobalSystem;
use crate::local_step::fit_rotations;
use crate::partition::ConstraintPartition;
use crate::state::SolverState;
use crate::weights::{CotangentWeights, lumped_mass};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Precomputation done; accepts steps.
    Ready,
    /// Resources released; every further call fails.
    Disposed,
}

/// Summary of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Local/global rounds actually performed.
    pub iterations: u32,
    /// Relative positional change of the last round.
    pub final_residual: f64,
    /// ARAP energy of the returned positions under the last fitted rotations.
    pub energy: f64,
    /// Whether the early-exit tolerance was reached.
    pub converged: bool,
    /// Cells that fell back to the identity rotation in the last round.
    pub degenerate_cells: usize,
    /// Wall-clock time for the step (seconds).
    pub wall_time: f64,
}

/// Everything a ready session owns.
struct Prepared {
    mesh: TriangleMesh,
    rest: Vec<DVec3>,
    topology: Topology,
    weights: CotangentWeights,
    partition: ConstraintPartition,
    system: GlobalSystem,
    dynamics: Option<DynamicsState>,
    state: SolverState,
    config: ArapConfig,
    bus: Option<EventBus>,
}

/// An ARAP deformation session for one mesh and one fixed handle set.
pub struct ArapSession {
    inner: Option<Box<Prepared>>,
}

impl ArapSession {
    /// Runs the full precomputation.
    ///
    /// # Errors
    /// - [`RigidError::InvalidConfig`] for a config that fails validation
    /// - [`RigidError::InvalidTopology`] for a malformed mesh
    /// - [`RigidError::EmptyConstraintSet`] / [`RigidError::InvalidConstraintIndex`]
    ///   for a bad handle list
    /// - [`RigidError::SingularSystem`] if the reduced system cannot be factorized
    pub fn create(
        mesh: &TriangleMesh,
        constraints: &[usize],
        config: ArapConfig,
    ) -> RigidResult<Self> {
        Self::build(mesh, constraints, config, None)
    }

    /// Like [`ArapSession::create`], with telemetry routed to `bus`.
    ///
    /// The bus is flushed at the end of creation, every step and disposal.
    pub fn create_with_bus(
        mesh: &TriangleMesh,
        constraints: &[usize],
        config: ArapConfig,
        bus: EventBus,
    ) -> RigidResult<Self> {
        Self::build(mesh, constraints, config, Some(bus))
    }

    fn build(
        mesh: &TriangleMesh,
        constraints: &[usize],
        config: ArapConfig,
        mut bus: Option<EventBus>,
    ) -> RigidResult<Self> {
        config.validate()?;

        let topology = Topology::build(mesh)?;
        let partition = ConstraintPartition::new(mesh.vertex_count(), constraints)?;
        let weights = CotangentWeights::compute(mesh, &topology, config.degenerate_threshold);
        let rest = mesh.positions();

        let dynamics = config
            .dynamics
            .clone()
            .map(|d| DynamicsState::new(d, &lumped_mass(mesh), &rest));
        let regularizer = dynamics.as_ref().map(|d| d.diagonal());

        partition.check_anchored(&weights.cells, regularizer)?;
        let reduced = partition.reduce(&weights.laplacian(), regularizer);
        let system = GlobalSystem::factorize(reduced)?;

        tracing::debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            edges = topology.edges.len(),
            handles = partition.constrained_count(),
            dynamics = dynamics.is_some(),
            "ARAP session created"
        );

        if let Some(bus) = bus.as_mut() {
            bus.emit(SolverEvent::new(
                0,
                EventKind::SessionCreated {
                    vertex_count: mesh.vertex_count() as u32,
                    triangle_count: mesh.triangle_count() as u32,
                    constrained_count: partition.constrained_count() as u32,
                    dynamics: dynamics.is_some(),
                },
            ));
            bus.flush();
        }

        let state = SolverState::at_rest(&rest);
        Ok(Self {
            inner: Some(Box::new(Prepared {
                mesh: mesh.clone(),
                rest,
                topology,
                weights,
                partition,
                system,
                dynamics,
                state,
                config,
                bus,
            })),
        })
    }

    fn ready(&self) -> RigidResult<&Prepared> {
        self.inner.as_deref().ok_or(RigidError::UseAfterDispose)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.inner.is_some() {
            SessionState::Ready
        } else {
            SessionState::Disposed
        }
    }

    /// Returns true until the session is disposed.
    pub fn is_ready(&self) -> bool {
        self.inner.is_some()
    }

    /// Moves the handles to `targets` (one per constraint, in creation order)
    /// and solves for every other vertex.
    ///
    /// A target count mismatch or a non-finite target fails with
    /// [`RigidError::InvalidInput`] and leaves the session unchanged.
    pub fn step(&mut self, targets: &[DVec3]) -> RigidResult<StepResult> {
        let inner = self.inner.as_deref_mut().ok_or(RigidError::UseAfterDispose)?;
        inner.step(targets)
    }

    /// Releases all owned state. A second call fails with `UseAfterDispose`.
    pub fn dispose(&mut self) -> RigidResult<()> {
        let mut inner = self.inner.take().ok_or(RigidError::UseAfterDispose)?;
        if let Some(bus) = inner.bus.as_mut() {
            bus.emit(SolverEvent::new(inner.state.frame, EventKind::Disposed));
            bus.finish();
        }
        tracing::debug!(frames = inner.state.frame, "ARAP session disposed");
        Ok(())
    }

    /// Number of mesh vertices.
    pub fn vertex_count(&self) -> RigidResult<usize> {
        Ok(self.ready()?.rest.len())
    }

    /// Number of mesh triangles.
    pub fn triangle_count(&self) -> RigidResult<usize> {
        Ok(self.ready()?.mesh.triangle_count())
    }

    /// Handle vertex indices in creation order.
    pub fn constraint_indices(&self) -> RigidResult<&[usize]> {
        Ok(&self.ready()?.partition.constrained)
    }

    /// Completed steps.
    pub fn frame(&self) -> RigidResult<u64> {
        Ok(self.ready()?.state.frame)
    }

    /// The configuration the session was created with.
    pub fn config(&self) -> RigidResult<&ArapConfig> {
        Ok(&self.ready()?.config)
    }

    /// Rest pose.
    pub fn rest_positions(&self) -> RigidResult<&[DVec3]> {
        Ok(&self.ready()?.rest)
    }

    /// Current solution, one position per vertex.
    pub fn positions(&self) -> RigidResult<&[DVec3]> {
        Ok(&self.ready()?.state.positions)
    }

    /// Rotations used by the last global step.
    pub fn rotations(&self) -> RigidResult<&[DMat3]> {
        Ok(&self.ready()?.state.rotations)
    }

    /// Edge weights, aligned with [`Topology::edges`].
    pub fn edge_weights(&self) -> RigidResult<&[f64]> {
        Ok(&self.ready()?.weights.edge_weights)
    }

    /// Topology of the rest mesh.
    pub fn topology(&self) -> RigidResult<&Topology> {
        Ok(&self.ready()?.topology)
    }

    /// ARAP energy of the current positions under the last fitted rotations.
    pub fn energy(&self) -> RigidResult<f64> {
        let inner = self.ready()?;
        Ok(arap_energy(
            &inner.weights.cells,
            &inner.rest,
            &inner.state.positions,
            &inner.state.rotations,
        ))
    }

    /// Writes the current solution as `[x0, y0, z0, x1, ...]`.
    pub fn write_positions(&self, out: &mut [f64]) -> RigidResult<()> {
        let positions = &self.ready()?.state.positions;
        if out.len() != positions.len() * 3 {
            return Err(RigidError::InvalidInput(format!(
                "Output buffer holds {} values, expected {}",
                out.len(),
                positions.len() * 3
            )));
        }
        for (chunk, p) in out.chunks_exact_mut(3).zip(positions) {
            chunk.copy_from_slice(&p.to_array());
        }
        Ok(())
    }
}

impl Prepared {
    fn step(&mut self, targets: &[DVec3]) -> RigidResult<StepResult> {
        let handle_count = self.partition.constrained_count();
        if targets.len() != handle_count {
            return Err(RigidError::InvalidInput(format!(
                "Expected {handle_count} handle targets, got {}",
                targets.len()
            )));
        }
        if let Some(k) = targets.iter().position(|t| !t.is_finite()) {
            return Err(RigidError::InvalidInput(format!(
                "Target {k} is not finite: {:?}",
                targets[k]
            )));
        }

        let start = Instant::now();
        let frame = self.state.frame;
        let max_iterations = self.config.max_iterations;
        self.emit(EventKind::StepBegin { max_iterations });

        let inertia = self
            .dynamics
            .as_ref()
            .map(|d| d.inertia_term(&self.partition));

        let mut previous = self.state.positions.clone();
        let mut iterations = 0;
        let mut final_residual = 0.0;
        let mut converged = false;
        let mut degenerate_cells = 0;

        // The first round fits rotations to the previous frame's solution;
        // the new targets enter through the global step. libigl's
        // `arap_solve` writes the targets before fitting, so its first-round
        // rotations (and intermediate frames) differ from these.
        for iteration in 0..max_iterations {
            let fit = fit_rotations(
                &self.weights.cells,
                &self.rest,
                &self.state.positions,
                self.config.degenerate_threshold,
                self.config.parallel,
            );
            degenerate_cells = fit.degenerate;
            if fit.degenerate > 0 {
                self.emit(EventKind::DegenerateCells {
                    iteration,
                    count: fit.degenerate as u32,
                });
            }

            previous.copy_from_slice(&self.state.positions);
            self.system.solve(
                &self.partition,
                &self.weights.cells,
                &self.rest,
                &fit.rotations,
                targets,
                inertia.as_deref(),
                &mut self.state.positions,
            )?;
            for (&v, &target) in self.partition.constrained.iter().zip(targets) {
                self.state.positions[v] = target;
            }
            self.state.rotations = fit.rotations;

            final_residual = self.state.relative_change(&previous);
            iterations = iteration + 1;

            if self.bus.is_some() {
                let energy = self.current_energy();
                self.emit(EventKind::SolverIteration {
                    iteration,
                    energy,
                    residual: final_residual,
                });
            }

            if self.config.tolerance > 0.0 && final_residual < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if degenerate_cells > 0 {
            tracing::warn!(
                frame,
                cells = degenerate_cells,
                "degenerate cells fell back to the identity rotation"
            );
        }

        if let Some(dynamics) = self.dynamics.as_mut() {
            dynamics.advance(&self.state.positions);
        }
        self.state.frame += 1;

        let energy = self.current_energy();
        let wall_time = start.elapsed().as_secs_f64();

        self.emit(EventKind::Convergence {
            iterations,
            final_residual,
            converged,
        });
        self.emit(EventKind::StepEnd { wall_time, energy });
        if let Some(bus) = self.bus.as_mut() {
            bus.flush();
        }

        tracing::debug!(
            frame,
            iterations,
            residual = final_residual,
            energy,
            "ARAP step finished"
        );

        Ok(StepResult {
            iterations,
            final_residual,
            energy,
            converged,
            degenerate_cells,
            wall_time,
        })
    }

    fn current_energy(&self) -> f64 {
        arap_energy(
            &self.weights.cells,
            &self.rest,
            &self.state.positions,
            &self.state.rotations,
        )
    }

    fn emit(&self, kind: EventKind) {
        if let Some(bus) = &self.bus {
            bus.emit(SolverEvent::new(self.state.frame, kind));
        }
    }
}

impl std::fmt::Debug for ArapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ArapSession");
        s.field("state", &self.state());
        if let Some(inner) = &self.inner {
            s.field("vertices", &inner.rest.len())
                .field("handles", &inner.partition.constrained_count())
                .field("factorized", &inner.system.is_factorized())
                .field("frame", &inner.state.frame);
        }
        s.finish()
    }
}
