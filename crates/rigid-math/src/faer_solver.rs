//! Sparse Cholesky solver backed by `faer`.
//!
//! Implements the [`SparseSolver`] trait using faer's supernodal LLᵀ
//! factorization.
//!
//! ## Workflow
//! 1. `factorize(matrix)`: converts CSR→CSC, computes symbolic + numeric LLᵀ
//! 2. `solve(rhs, solution)`: forward/backward substitution (cached factorization)
//! 3. Repeat `solve()` with different RHS without re-factorizing

use faer::Side;
use faer::linalg::solvers::Solve;
use faer::sparse::SparseColMat;
use faer::sparse::Triplet;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};

use rigid_types::{RigidError, RigidResult};

use crate::sparse::{CsrMatrix, SparseSolver};

/// Sparse Cholesky (LLᵀ) solver using `faer`.
///
/// Stores the factorization for reuse across multiple solves.
/// The reduced ARAP system depends only on the rest shape and the
/// handle indices, so one factorization serves every step of a session.
pub struct FaerSolver {
    /// Cached LLᵀ factorization.
    factorization: Option<Llt<usize, f64>>,
    /// Matrix dimension (N×N).
    dimension: usize,
}

impl FaerSolver {
    /// Creates a new solver (unfactorized).
    pub fn new() -> Self {
        Self {
            factorization: None,
            dimension: 0,
        }
    }

    /// Convert our CSR matrix to faer's CSC matrix.
    ///
    /// Builds from faer `Triplet`s, which faer assembles into CSC format.
    fn csr_to_csc(matrix: &CsrMatrix) -> RigidResult<SparseColMat<usize, f64>> {
        let mut triplets: Vec<Triplet<usize, usize, f64>> = Vec::with_capacity(matrix.nnz());
        for row in 0..matrix.rows {
            for (col, val) in matrix.row(row) {
                if !val.is_finite() {
                    return Err(RigidError::SingularSystem(format!(
                        "non-finite entry {val} at ({row}, {col})"
                    )));
                }
                triplets.push(Triplet { row, col, val });
            }
        }

        SparseColMat::try_new_from_triplets(matrix.rows, matrix.cols, &triplets).map_err(|e| {
            RigidError::InvalidInput(format!("Failed to construct faer CSC matrix: {e:?}"))
        })
    }
}

impl Default for FaerSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseSolver for FaerSolver {
    fn factorize(&mut self, matrix: &CsrMatrix) -> RigidResult<()> {
        if matrix.rows != matrix.cols {
            return Err(RigidError::InvalidInput(format!(
                "Matrix must be square, got {}×{}",
                matrix.rows, matrix.cols
            )));
        }
        if matrix.rows == 0 {
            return Err(RigidError::InvalidInput("Cannot factorize empty matrix".into()));
        }

        self.factorization = None;
        self.dimension = matrix.rows;

        let csc = Self::csr_to_csc(matrix)?;

        // Step 1: Symbolic analysis (ordering, fill-in prediction)
        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| RigidError::SingularSystem(format!("Symbolic analysis failed: {e:?}")))?;

        // Step 2: Numeric factorization (using the symbolic structure).
        // A non-positive pivot means the reduced Laplacian is singular.
        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper).map_err(|e| {
            RigidError::SingularSystem(format!("Cholesky factorization failed: {e:?}"))
        })?;

        self.factorization = Some(llt);
        Ok(())
    }

    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> RigidResult<()> {
        let llt = self.factorization.as_ref().ok_or_else(|| {
            RigidError::InvalidInput("Solver not factorized. Call factorize() first.".into())
        })?;

        if rhs.len() != self.dimension {
            return Err(RigidError::InvalidInput(format!(
                "RHS length ({}) != matrix dimension ({})",
                rhs.len(),
                self.dimension
            )));
        }
        if solution.len() != self.dimension {
            return Err(RigidError::InvalidInput(format!(
                "Solution length ({}) != matrix dimension ({})",
                solution.len(),
                self.dimension
            )));
        }

        let rhs_col: faer::Mat<f64> = faer::Mat::from_fn(self.dimension, 1, |i, _| rhs[i]);

        // Solve using cached factorization: L L^T x = b
        let sol = llt.solve(&rhs_col);

        for (i, slot) in solution.iter_mut().enumerate() {
            *slot = sol[(i, 0)];
        }

        Ok(())
    }

    fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
