//! Local step: best-fit rotation per cell.
//!
//! Each cell's covariance `S_i = Σ_j w_ij (x_i − x_j)(p_i − p_j)ᵀ` only
//! reads positions, so cells are fitted independently. The parallel path
//! maps over vertices with rayon and collects in vertex order, which makes
//! it bit-identical to the sequential one.

use rayon::prelude::*;

use rigid_math::decomposition::{best_fit_rotation, outer};
use rigid_math::{DMat3, DVec3};

use crate::weights::Spoke;

/// Rotations produced by one local step.
#[derive(Debug, Clone)]
pub struct LocalFit {
    /// One proper rotation per vertex.
    pub rotations: Vec<DMat3>,
    /// Non-empty cells whose covariance was degenerate (identity fallback).
    pub degenerate: usize,
}

/// Weighted covariance between rest and current edge vectors of cell `i`.
pub fn cell_covariance(i: usize, cell: &[Spoke], rest: &[DVec3], current: &[DVec3]) -> DMat3 {
    let mut covariance = DMat3::ZERO;
    for spoke in cell {
        let j = spoke.neighbor as usize;
        let rest_edge = rest[i] - rest[j];
        let current_edge = current[i] - current[j];
        covariance += outer(rest_edge, current_edge) * spoke.weight;
    }
    covariance
}

/// Upper bound of `‖S_i‖_F`: `Σ_j |w_ij| |x_i − x_j| |p_i − p_j|`.
pub fn cell_scale(i: usize, cell: &[Spoke], rest: &[DVec3], current: &[DVec3]) -> f64 {
    cell.iter()
        .map(|spoke| {
            let j = spoke.neighbor as usize;
            spoke.weight.abs() * (rest[i] - rest[j]).length() * (current[i] - current[j]).length()
        })
        .sum()
}

/// Fits one cell. `None` marks a degenerate non-empty cell.
///
/// The covariance norm is compared against `threshold` times its upper
/// bound, so the test does not depend on the mesh scale.
fn fit_cell(
    i: usize,
    cell: &[Spoke],
    rest: &[DVec3],
    current: &[DVec3],
    threshold: f64,
) -> Option<DMat3> {
    if cell.is_empty() {
        return Some(DMat3::IDENTITY);
    }
    let scale = cell_scale(i, cell, rest, current);
    best_fit_rotation(&cell_covariance(i, cell, rest, current), threshold * scale)
}

/// Fits a rotation for every cell.
pub fn fit_rotations(
    cells: &[Vec<Spoke>],
    rest: &[DVec3],
    current: &[DVec3],
    threshold: f64,
    parallel: bool,
) -> LocalFit {
    let fitted: Vec<Option<DMat3>> = if parallel {
        cells
            .par_iter()
            .enumerate()
            .map(|(i, cell)| fit_cell(i, cell, rest, current, threshold))
            .collect()
    } else {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| fit_cell(i, cell, rest, current, threshold))
            .collect()
    };

    let degenerate = fitted.iter().filter(|r| r.is_none()).count();
    let rotations = fitted
        .into_iter()
        .map(|r| r.unwrap_or(DMat3::IDENTITY))
        .collect();

    LocalFit {
        rotations,
        degenerate,
    }
}
