//! ARAP energy.

use rigid_math::{DMat3, DVec3};

use crate::weights::Spoke;

/// `E = Σ_i Σ_j w_ij ‖(p_i − p_j) − R_i (x_i − x_j)‖²` over every cell.
///
/// Both directions of each edge are counted, once per cell.
pub fn arap_energy(
    cells: &[Vec<Spoke>],
    rest: &[DVec3],
    current: &[DVec3],
    rotations: &[DMat3],
) -> f64 {
    let mut energy = 0.0;
    for (i, cell) in cells.iter().enumerate() {
        for spoke in cell {
            let j = spoke.neighbor as usize;
            let deviation = (current[i] - current[j]) - rotations[i] * (rest[i] - rest[j]);
            energy += spoke.weight * deviation.length_squared();
        }
    }
    energy
}
