//! Free/constrained vertex partition and the reduced system blocks.
//!
//! With `K = −L` and vertices split into free (`f`) and constrained (`c`)
//! sets, the global step solves
//!
//! ```text
//! K_ff · p_f = b_f − K_fc · t_c
//! ```
//!
//! `K_ff` is factorized once; `K_fc` moves the handle targets to the
//! right-hand side on every iteration.

use std::collections::VecDeque;

use rigid_math::sparse::CsrMatrix;
use rigid_types::constants::EPSILON;
use rigid_types::{RigidError, RigidResult};

use crate::weights::Spoke;

/// Where a vertex lives in the reduced system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Row of the free block.
    Free(usize),
    /// Position in the caller's constraint list.
    Constrained(usize),
}

/// Split of the vertex range into free and constrained vertices.
#[derive(Debug, Clone)]
pub struct ConstraintPartition {
    /// Free vertex indices in ascending order.
    pub free: Vec<usize>,
    /// Constrained vertex indices in the caller's order.
    pub constrained: Vec<usize>,
    /// Per-vertex slot lookup.
    pub slots: Vec<Slot>,
}

/// The reduced blocks of `K = −L`, optionally regularized by a mass term.
#[derive(Debug, Clone)]
pub struct ReducedSystem {
    /// Free × free block (`K_ff + inertia · M_ff` with dynamics).
    pub k_ff: CsrMatrix,
    /// Free × constrained block, columns in constraint order.
    pub k_fc: CsrMatrix,
}

impl ConstraintPartition {
    /// Validates `constraints` and builds the partition.
    ///
    /// Fails with [`RigidError::EmptyConstraintSet`] for an empty list and with
    /// [`RigidError::InvalidConstraintIndex`] for out-of-range or repeated indices.
    pub fn new(vertex_count: usize, constraints: &[usize]) -> RigidResult<Self> {
        if constraints.is_empty() {
            return Err(RigidError::EmptyConstraintSet);
        }

        let mut slots: Vec<Option<Slot>> = vec![None; vertex_count];
        for (k, &v) in constraints.iter().enumerate() {
            if v >= vertex_count {
                return Err(RigidError::constraint(
                    v as i64,
                    format!("out of range (vertex count: {vertex_count})"),
                ));
            }
            if slots[v].is_some() {
                return Err(RigidError::constraint(v as i64, "listed more than once"));
            }
            slots[v] = Some(Slot::Constrained(k));
        }

        let mut free = Vec::with_capacity(vertex_count - constraints.len());
        let slots = slots
            .into_iter()
            .enumerate()
            .map(|(v, slot)| {
                slot.unwrap_or_else(|| {
                    free.push(v);
                    Slot::Free(free.len() - 1)
                })
            })
            .collect();

        Ok(Self {
            free,
            constrained: constraints.to_vec(),
            slots,
        })
    }

    /// Number of vertices in the partition.
    pub fn vertex_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of free vertices.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of constrained vertices.
    pub fn constrained_count(&self) -> usize {
        self.constrained.len()
    }

    /// Returns true if vertex `v` is a handle.
    pub fn is_constrained(&self, v: usize) -> bool {
        matches!(self.slots[v], Slot::Constrained(_))
    }

    /// Fails with [`RigidError::SingularSystem`] if some free vertex cannot
    /// reach a constrained vertex through edges of non-zero weight and has
    /// no mass to anchor it. Such a vertex makes `K_ff` singular (its
    /// component can translate freely).
    pub fn check_anchored(&self, cells: &[Vec<Spoke>], mass: Option<&[f64]>) -> RigidResult<()> {
        let mut anchored = vec![false; self.vertex_count()];
        let mut queue = VecDeque::new();

        for v in 0..self.vertex_count() {
            let massive = mass.is_some_and(|m| m[v] > 0.0);
            if self.is_constrained(v) || massive {
                anchored[v] = true;
                queue.push_back(v);
            }
        }
        while let Some(v) = queue.pop_front() {
            for spoke in &cells[v] {
                let n = spoke.neighbor as usize;
                if spoke.weight.abs() > EPSILON && !anchored[n] {
                    anchored[n] = true;
                    queue.push_back(n);
                }
            }
        }

        match self.free.iter().find(|&&v| !anchored[v]) {
            Some(v) => Err(RigidError::SingularSystem(format!(
                "free vertex {v} is not connected to any handle vertex"
            ))),
            None => Ok(()),
        }
    }

    /// Extracts `K_ff` and `K_fc` from the Laplacian.
    ///
    /// `regularizer` adds a per-vertex diagonal term (scaled mass) to `K_ff`.
    pub fn reduce(&self, laplacian: &CsrMatrix, regularizer: Option<&[f64]>) -> ReducedSystem {
        let nf = self.free_count();
        let nc = self.constrained_count();
        let mut ff = Vec::with_capacity(laplacian.nnz());
        let mut fc = Vec::new();

        for (f, &i) in self.free.iter().enumerate() {
            for (j, value) in laplacian.row(i) {
                match self.slots[j] {
                    Slot::Free(g) => ff.push((f, g, -value)),
                    Slot::Constrained(c) => fc.push((f, c, -value)),
                }
            }
            if let Some(diag) = regularizer {
                ff.push((f, f, diag[i]));
            }
        }

        ReducedSystem {
            k_ff: CsrMatrix::from_triplets(nf, nf, &ff),
            k_fc: CsrMatrix::from_triplets(nf, nc, &fc),
        }
    }
}
