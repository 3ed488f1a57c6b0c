//! Vertex normal computation from triangle mesh data.
//!
//! Computes area-weighted vertex normals by accumulating
//! face normals from each adjacent triangle.

use rigid_math::DVec3;

/// Area-weighted vertex normals for arbitrary positions over a fixed index buffer.
///
/// Each triangle's face normal (weighted by its area) is accumulated at each
/// of its vertices and the result normalized. Vertices with no incident
/// area keep a zero normal.
pub fn vertex_normals(positions: &[DVec3], indices: &[u32]) -> Vec<DVec3> {
    let mut normals = vec![DVec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];

        // Magnitude = 2 × triangle area
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);

        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }

    for n in &mut normals {
        *n = n.normalize_or_zero();
    }

    normals
}

/// Unit face normal of a triangle, or zero for a degenerate one.
#[inline]
pub fn face_normal(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    (b - a).cross(c - a).normalize_or_zero()
}
