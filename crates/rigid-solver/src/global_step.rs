//! Global step: solve for free positions given fitted rotations.
//!
//! The right-hand side for a free vertex `i` is gathered from its cell,
//!
//! ```text
//! b_i = Σ_j (w_ij / 2)(R_i + R_j)(x_i − x_j) − Σ_c K_ic t_c  [+ inertia · M_i · y_i]
//! ```
//!
//! and the three coordinates are solved against one cached factorization.
//! Gathering (rather than scattering edge contributions) fixes the
//! summation order per vertex, so results do not depend on threading.

use rigid_math::faer_solver::FaerSolver;
use rigid_math::sparse::{CsrMatrix, SparseSolver};
use rigid_math::{DMat3, DVec3};
use rigid_types::RigidResult;

use crate::partition::{ConstraintPartition, ReducedSystem};
use crate::weights::Spoke;

/// Prefactored reduced system.
pub struct GlobalSystem {
    /// Cholesky factor of `K_ff`; `None` when every vertex is a handle.
    solver: Option<FaerSolver>,
    /// Coupling block moving handle targets to the right-hand side.
    k_fc: CsrMatrix,
}

/// Per-free-vertex inertia contribution `inertia · M_i · y_i`.
pub type InertiaTerm<'a> = Option<&'a [DVec3]>;

impl GlobalSystem {
    /// Factorizes `K_ff`.
    ///
    /// A failed factorization surfaces as [`rigid_types::RigidError::SingularSystem`].
    pub fn factorize(system: ReducedSystem) -> RigidResult<Self> {
        let solver = if system.k_ff.rows == 0 {
            None
        } else {
            let mut solver = FaerSolver::new();
            solver.factorize(&system.k_ff)?;
            Some(solver)
        };
        Ok(Self {
            solver,
            k_fc: system.k_fc,
        })
    }

    /// Returns true if a factorization was built.
    pub fn is_factorized(&self) -> bool {
        self.solver.as_ref().is_some_and(|s| s.is_factorized())
    }

    /// Dimension of the free block.
    pub fn free_count(&self) -> usize {
        self.k_fc.rows
    }

    /// Writes new free-vertex positions into `positions`.
    ///
    /// `inertia` holds one term per free vertex, in free order. Handle
    /// entries of `positions` are left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &self,
        partition: &ConstraintPartition,
        cells: &[Vec<Spoke>],
        rest: &[DVec3],
        rotations: &[DMat3],
        targets: &[DVec3],
        inertia: InertiaTerm<'_>,
        positions: &mut [DVec3],
    ) -> RigidResult<()> {
        let Some(solver) = &self.solver else {
            return Ok(());
        };

        let nf = partition.free_count();
        let mut rhs_x = vec![0.0; nf];
        let mut rhs_y = vec![0.0; nf];
        let mut rhs_z = vec![0.0; nf];

        for (f, &i) in partition.free.iter().enumerate() {
            let mut b = DVec3::ZERO;
            for spoke in &cells[i] {
                let j = spoke.neighbor as usize;
                let rotation = rotations[i] + rotations[j];
                b += rotation * (rest[i] - rest[j]) * (0.5 * spoke.weight);
            }
            for (c, k) in self.k_fc.row(f) {
                b -= targets[c] * k;
            }
            if let Some(term) = inertia {
                b += term[f];
            }
            rhs_x[f] = b.x;
            rhs_y[f] = b.y;
            rhs_z[f] = b.z;
        }

        let mut sol_x = vec![0.0; nf];
        let mut sol_y = vec![0.0; nf];
        let mut sol_z = vec![0.0; nf];
        solver.solve(&rhs_x, &mut sol_x)?;
        solver.solve(&rhs_y, &mut sol_y)?;
        solver.solve(&rhs_z, &mut sol_z)?;

        for (f, &i) in partition.free.iter().enumerate() {
            positions[i] = DVec3::new(sol_x[f], sol_y[f], sol_z[f]);
        }
        Ok(())
    }
}
