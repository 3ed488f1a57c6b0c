//! Transfer of a coarse control-mesh deformation onto a dense point set.
//!
//! Deforming a dense mesh directly is expensive, so hosts typically run the
//! solver on a simplified control mesh and carry the result over. Each dense
//! point is bound to its closest control triangle by barycentric coordinates
//! plus a signed offset along the interpolated vertex normal. After a solve,
//! [`SurfaceMapping::apply`] rebuilds every point from the deformed control
//! positions.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use rigid_math::DVec3;
use rigid_types::{RigidError, RigidResult, TriangleId};

use crate::mesh::TriangleMesh;
use crate::normals::vertex_normals;

/// Binding of one dense point to a control triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointBinding {
    /// Control triangle.
    pub triangle: TriangleId,
    /// Barycentric coordinates of the closest point on that triangle.
    pub barycentric: [f64; 3],
    /// Signed distance along the interpolated normal.
    pub offset: f64,
}

/// Bounding sphere of a control triangle, used to prune the closest-triangle search.
#[derive(Debug, Clone, Copy)]
struct BoundingSphere {
    center: DVec3,
    radius: f64,
}

impl BoundingSphere {
    fn of_triangle(a: DVec3, b: DVec3, c: DVec3) -> Self {
        let center = (a + b + c) / 3.0;
        let radius = center
            .distance(a)
            .max(center.distance(b))
            .max(center.distance(c));
        Self {
            center,
            radius: radius + 1e-9,
        }
    }
}

/// Mapping from a control mesh to a dense point set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceMapping {
    /// Control mesh triangle buffer (flat, 3 per triangle).
    indices: Vec<u32>,
    /// Control mesh vertex count.
    control_vertex_count: usize,
    /// One binding per dense point.
    bindings: Vec<PointBinding>,
}

impl SurfaceMapping {
    /// Binds every point in `points` to the closest triangle of `control`.
    ///
    /// Binding runs in parallel over points; the result does not depend on
    /// scheduling.
    pub fn build(control: &TriangleMesh, points: &[DVec3]) -> RigidResult<Self> {
        control.validate()?;
        if control.triangle_count() == 0 {
            return Err(RigidError::InvalidTopology(
                "Control mesh has no triangles to bind to".into(),
            ));
        }

        let positions = control.positions();
        let normals = vertex_normals(&positions, &control.indices);
        let spheres: Vec<BoundingSphere> = (0..control.triangle_count())
            .map(|t| {
                let [a, b, c] = control.triangle(t);
                BoundingSphere::of_triangle(
                    positions[a as usize],
                    positions[b as usize],
                    positions[c as usize],
                )
            })
            .collect();

        let bindings = points
            .par_iter()
            .map(|&p| bind_point(p, control, &positions, &normals, &spheres))
            .collect();

        Ok(Self {
            indices: control.indices.clone(),
            control_vertex_count: control.vertex_count(),
            bindings,
        })
    }

    /// Number of bound points.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no points are bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Per-point bindings, in input order.
    pub fn bindings(&self) -> &[PointBinding] {
        &self.bindings
    }

    /// Reconstructs the dense points from deformed control positions.
    pub fn apply(&self, control_positions: &[DVec3]) -> RigidResult<Vec<DVec3>> {
        if control_positions.len() != self.control_vertex_count {
            return Err(RigidError::InvalidInput(format!(
                "Expected {} control positions, got {}",
                self.control_vertex_count,
                control_positions.len()
            )));
        }

        let normals = vertex_normals(control_positions, &self.indices);

        Ok(self
            .bindings
            .iter()
            .map(|binding| {
                let t = binding.triangle.index();
                let tri = [
                    self.indices[t * 3] as usize,
                    self.indices[t * 3 + 1] as usize,
                    self.indices[t * 3 + 2] as usize,
                ];
                let [u, v, w] = binding.barycentric;
                let base = control_positions[tri[0]] * u
                    + control_positions[tri[1]] * v
                    + control_positions[tri[2]] * w;
                let normal =
                    (normals[tri[0]] * u + normals[tri[1]] * v + normals[tri[2]] * w).normalize_or_zero();
                base + normal * binding.offset
            })
            .collect())
    }
}

fn bind_point(
    p: DVec3,
    control: &TriangleMesh,
    positions: &[DVec3],
    normals: &[DVec3],
    spheres: &[BoundingSphere],
) -> PointBinding {
    let mut best_dist = f64::INFINITY;
    let mut best = (0usize, [1.0 / 3.0; 3], DVec3::ZERO);

    for (t, sphere) in spheres.iter().enumerate() {
        // Nothing inside this sphere can beat the current best.
        if p.distance(sphere.center) - sphere.radius > best_dist {
            continue;
        }
        let [a, b, c] = control.triangle(t);
        let (closest, bary) = closest_point_on_triangle(
            p,
            positions[a as usize],
            positions[b as usize],
            positions[c as usize],
        );
        let dist = p.distance(closest);
        if dist < best_dist {
            best_dist = dist;
            best = (t, bary, closest);
        }
    }

    let (t, bary, closest) = best;
    let [a, b, c] = control.triangle(t);
    let normal = (normals[a as usize] * bary[0]
        + normals[b as usize] * bary[1]
        + normals[c as usize] * bary[2])
        .normalize_or_zero();
    let dir = p - closest;
    let offset = if dir.dot(normal) < 0.0 {
        -dir.length()
    } else {
        dir.length()
    };

    PointBinding {
        triangle: TriangleId(t as u32),
        barycentric: bary,
        offset,
    }
}

/// Closest point to `p` on triangle `(a, b, c)`, with its barycentric coordinates.
///
/// Voronoi-region classification; handles degenerate triangles by falling
/// back to the nearest vertex or edge.
pub fn closest_point_on_triangle(p: DVec3, a: DVec3, b: DVec3, c: DVec3) -> (DVec3, [f64; 3]) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, [1.0, 0.0, 0.0]);
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, [0.0, 1.0, 0.0]);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, [1.0 - v, v, 0.0]);
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, [0.0, 0.0, 1.0]);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, [1.0 - w, 0.0, w]);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, [0.0, 1.0 - w, w]);
    }

    let denom = va + vb + vc;
    if denom.abs() < f64::EPSILON {
        return (a, [1.0, 0.0, 0.0]);
    }
    let v = vb / denom;
    let w = vc / denom;
    (a + ab * v + ac * w, [1.0 - v - w, v, w])
}
