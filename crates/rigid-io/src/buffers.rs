//! Flat buffer marshaling.
//!
//! Converts between the host's flat numeric buffers and the solver's
//! vector types. Index order is preserved exactly: element `k` of a flat
//! buffer always maps to component `k % 3` of item `k / 3`.

use rigid_math::DVec3;
use rigid_types::{RigidError, RigidResult};

/// `[x0, y0, z0, x1, ...]` → points.
pub fn points_from_flat(flat: &[f64]) -> RigidResult<Vec<DVec3>> {
    if flat.len() % 3 != 0 {
        return Err(RigidError::InvalidInput(format!(
            "Point buffer length {} is not a multiple of 3",
            flat.len()
        )));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|c| DVec3::new(c[0], c[1], c[2]))
        .collect())
}

/// Points → `[x0, y0, z0, x1, ...]`.
pub fn points_to_flat(points: &[DVec3]) -> Vec<f64> {
    let mut flat = Vec::with_capacity(points.len() * 3);
    for p in points {
        flat.extend_from_slice(&p.to_array());
    }
    flat
}

/// Signed triangle indices → unsigned. Negative values are [`RigidError::InvalidTopology`];
/// range checks happen when the topology is built.
pub fn triangle_indices(flat: &[i32]) -> RigidResult<Vec<u32>> {
    if flat.len() % 3 != 0 {
        return Err(RigidError::InvalidTopology(format!(
            "Triangle buffer length {} is not a multiple of 3",
            flat.len()
        )));
    }
    flat.iter()
        .enumerate()
        .map(|(k, &i)| {
            u32::try_from(i).map_err(|_| {
                RigidError::InvalidTopology(format!(
                    "Triangle {} references negative vertex {i}",
                    k / 3
                ))
            })
        })
        .collect()
}

/// Signed handle indices → `usize`. Negative values are
/// [`RigidError::InvalidConstraintIndex`].
pub fn constraint_indices(flat: &[i32]) -> RigidResult<Vec<usize>> {
    flat.iter()
        .map(|&i| {
            usize::try_from(i).map_err(|_| RigidError::constraint(i, "negative vertex index"))
        })
        .collect()
}
