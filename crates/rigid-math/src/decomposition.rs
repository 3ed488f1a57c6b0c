//! Rotation fitting for the ARAP local step.
//!
//! Given the weighted covariance between rest-pose and current-pose edge
//! vectors of a cell, finds the proper rotation that best aligns them in the
//! least-squares sense (orthogonal Procrustes). The 3×3 SVD is delegated to
//! `nalgebra`; the rest of the engine works in `glam` types.

use glam::{DMat3, DVec3};
use nalgebra::{Matrix3, SVD};

/// Outer product `a · bᵀ`.
#[inline]
pub fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Frobenius norm of a 3×3 matrix.
#[inline]
pub fn frobenius_norm(m: &DMat3) -> f64 {
    m.to_cols_array().iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Best-fit rotation for a cell covariance `S = Σ wᵢⱼ eᵢⱼ e'ᵢⱼᵀ`.
///
/// With the SVD `S = U Σ Vᵀ`, the optimum is `R = V Uᵀ`. If that is a
/// reflection (`det R < 0`), the column of `U` belonging to the smallest
/// singular value is negated, which yields the closest proper rotation.
///
/// Returns `None` when the covariance norm is not above `threshold`, contains
/// non-finite values, or the SVD fails to produce both factors. Callers
/// fall back to the identity in that case.
pub fn best_fit_rotation(covariance: &DMat3, threshold: f64) -> Option<DMat3> {
    let norm = frobenius_norm(covariance);
    if !norm.is_finite() || norm <= threshold {
        return None;
    }

    let s = Matrix3::from_column_slice(&covariance.to_cols_array());
    let svd = SVD::new(s, true, true);
    let (mut u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return None,
    };

    let mut rotation = v_t.transpose() * u.transpose();
    if rotation.determinant() < 0.0 {
        let sigma = svd.singular_values;
        let smallest = (0..3)
            .min_by(|&a, &b| sigma[a].total_cmp(&sigma[b]))
            .unwrap_or(2);
        u.column_mut(smallest).neg_mut();
        rotation = v_t.transpose() * u.transpose();
    }

    let result = DMat3::from_cols_slice(rotation.as_slice());
    if result.is_finite() { Some(result) } else { None }
}

/// Returns true if `m` is orthogonal with determinant +1 (within `tol`).
pub fn is_proper_rotation(m: &DMat3, tol: f64) -> bool {
    let gram = m.transpose() * *m;
    let deviation = gram - DMat3::IDENTITY;
    frobenius_norm(&deviation) <= tol && (m.determinant() - 1.0).abs() <= tol
}
