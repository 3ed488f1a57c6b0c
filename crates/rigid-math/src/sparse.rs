//! Sparse matrix representation and solver interface.
//!
//! Provides a CSR (Compressed Sparse Row) matrix and a trait
//! for sparse Cholesky solvers. The Laplacian, its reduced blocks
//! and the mass matrix are all stored in this format.

use serde::{Deserialize, Serialize};

use rigid_types::RigidResult;

/// Compressed Sparse Row (CSR) matrix.
///
/// Stores a sparse matrix in row-major order. Column indices within a row
/// are sorted and unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Row pointer array (length = rows + 1).
    /// `row_ptr[i]..row_ptr[i+1]` are the indices into `col_idx` and `values`
    /// for non-zeros in row `i`.
    pub row_ptr: Vec<usize>,
    /// Column indices of non-zero entries.
    pub col_idx: Vec<usize>,
    /// Non-zero values.
    pub values: Vec<f64>,
}

impl CsrMatrix {
    /// Creates an empty CSR matrix with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Returns the number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Creates a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries are summed.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        // Count entries per row
        let mut row_counts = vec![0usize; rows];
        for &(r, _, _) in triplets {
            row_counts[r] += 1;
        }

        let mut row_start = vec![0usize; rows + 1];
        for i in 0..rows {
            row_start[i + 1] = row_start[i] + row_counts[i];
        }

        // Scatter into row buckets, using a copy of the starts as write cursor
        let mut bucket: Vec<(usize, f64)> = vec![(0, 0.0); row_start[rows]];
        let mut cursor = row_start[..rows].to_vec();
        for &(r, c, v) in triplets {
            bucket[cursor[r]] = (c, v);
            cursor[r] += 1;
        }

        // Sort each row and merge duplicates
        let mut row_ptr = Vec::with_capacity(rows + 1);
        let mut col_idx = Vec::with_capacity(bucket.len());
        let mut values = Vec::with_capacity(bucket.len());
        row_ptr.push(0);

        for i in 0..rows {
            let row = &mut bucket[row_start[i]..row_start[i + 1]];
            row.sort_by_key(|&(c, _)| c);

            let first = col_idx.len();
            for &(c, v) in row.iter() {
                if col_idx.len() > first && col_idx[col_idx.len() - 1] == c {
                    let last = values.len() - 1;
                    values[last] += v;
                } else {
                    col_idx.push(c);
                    values.push(v);
                }
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Iterates the stored `(col, value)` entries of one row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Returns the entry at `(row, col)`, or zero if it is not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let start = self.row_ptr[row];
        let end = self.row_ptr[row + 1];
        match self.col_idx[start..end].binary_search(&col) {
            Ok(pos) => self.values[start + pos],
            Err(_) => 0.0,
        }
    }

    /// Computes `out = self * x`.
    ///
    /// # Panics
    /// Panics if `x.len() != cols` or `out.len() != rows`.
    pub fn mul_vec(&self, x: &[f64], out: &mut [f64]) {
        assert_eq!(x.len(), self.cols, "vector length must match column count");
        assert_eq!(out.len(), self.rows, "output length must match row count");
        for (r, slot) in out.iter_mut().enumerate() {
            *slot = self.row(r).map(|(c, v)| v * x[c]).sum();
        }
    }

    /// Returns true if the matrix is square and `|A_ij - A_ji| <= tol` for all entries.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if self.rows != self.cols {
            return false;
        }
        (0..self.rows).all(|r| self.row(r).all(|(c, v)| (v - self.get(c, r)).abs() <= tol))
    }
}

/// Trait for sparse symmetric positive-definite solvers.
///
/// Implementations: [`FaerSolver`](crate::faer_solver::FaerSolver).
pub trait SparseSolver: Send {
    /// Factorize the matrix. Call once per constraint configuration.
    fn factorize(&mut self, matrix: &CsrMatrix) -> RigidResult<()>;

    /// Solve Ax = b using the pre-computed factorization.
    /// Returns x in the provided output buffer.
    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> RigidResult<()>;

    /// Returns true if the solver holds a valid factorization.
    fn is_factorized(&self) -> bool;

    /// Dimension of the factorized system (0 before factorization).
    fn dimension(&self) -> usize;
}
