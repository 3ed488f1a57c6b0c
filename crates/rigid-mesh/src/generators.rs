//! Procedural mesh generators for tests, benchmarks and the CLI.
//!
//! These generators produce deterministic, resolution-configurable meshes
//! with consistent counter-clockwise winding.

use rigid_math::DVec3;

use crate::mesh::TriangleMesh;

/// A single right triangle in the XY plane with unit legs.
pub fn single_triangle() -> TriangleMesh {
    let mut mesh = TriangleMesh::with_capacity(3, 1);
    mesh.push_vertex(DVec3::ZERO);
    mesh.push_vertex(DVec3::X);
    mesh.push_vertex(DVec3::Y);
    mesh.push_triangle(0, 1, 2);
    mesh
}

/// Generates a flat rectangular quad grid in the XY plane.
///
/// The grid spans `[-width/2, width/2]` in X and `[-height/2, height/2]` in Y,
/// centered at the origin at Z=0. Vertex `j * (cols + 1) + i` sits in
/// column `i`, row `j`, rows running from top (+Y) to bottom.
///
/// # Arguments
/// - `cols`: Number of quads along X (vertex count = cols + 1).
/// - `rows`: Number of quads along Y (vertex count = rows + 1).
/// - `width`: Total width.
/// - `height`: Total height.
///
/// # Example
/// ```
/// use rigid_mesh::generators::quad_grid;
/// let mesh = quad_grid(2, 2, 1.0, 1.0);
/// assert_eq!(mesh.vertex_count(), 9);  // 3×3 vertices
/// assert_eq!(mesh.triangle_count(), 8); // 2×2 quads × 2 tris each
/// ```
pub fn quad_grid(cols: usize, rows: usize, width: f64, height: f64) -> TriangleMesh {
    let verts_x = cols + 1;
    let verts_y = rows + 1;
    let mut mesh = TriangleMesh::with_capacity(verts_x * verts_y, cols * rows * 2);

    let half_w = width / 2.0;
    let half_h = height / 2.0;

    for j in 0..verts_y {
        for i in 0..verts_x {
            let u = i as f64 / cols as f64;
            let v = j as f64 / rows as f64;
            mesh.push_vertex(DVec3::new(-half_w + u * width, half_h - v * height, 0.0));
        }
    }

    // Two triangles per quad
    for j in 0..rows {
        for i in 0..cols {
            let top_left = (j * verts_x + i) as u32;
            let top_right = top_left + 1;
            let bot_left = top_left + verts_x as u32;
            let bot_right = bot_left + 1;

            mesh.push_triangle(top_left, bot_left, top_right);
            mesh.push_triangle(top_right, bot_left, bot_right);
        }
    }

    mesh
}

/// Generates an open cylinder around the Y axis, from `y = 0` to `y = height`.
///
/// Ring `r` holds vertices `r * segments .. (r + 1) * segments`; the seam is
/// shared, so the tube has boundary only at its two end rings.
pub fn cylinder(radius: f64, height: f64, rings: usize, segments: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::with_capacity((rings + 1) * segments, rings * segments * 2);

    for r in 0..=rings {
        let y = height * r as f64 / rings as f64;
        for s in 0..segments {
            let theta = 2.0 * std::f64::consts::PI * s as f64 / segments as f64;
            mesh.push_vertex(DVec3::new(radius * theta.cos(), y, radius * theta.sin()));
        }
    }

    for r in 0..rings {
        for s in 0..segments {
            let a = (r * segments + s) as u32;
            let b = (r * segments + (s + 1) % segments) as u32;
            let c = a + segments as u32;
            let d = b + segments as u32;
            mesh.push_triangle(a, c, b);
            mesh.push_triangle(b, c, d);
        }
    }

    mesh
}

/// Generates a UV sphere centered at the origin.
///
/// # Arguments
/// - `radius`: Sphere radius.
/// - `stacks`: Number of horizontal slices (latitude divisions).
/// - `slices`: Number of vertical slices (longitude divisions).
pub fn uv_sphere(radius: f64, stacks: usize, slices: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::with_capacity((stacks + 1) * (slices + 1), stacks * slices * 2);

    for i in 0..=stacks {
        let phi = std::f64::consts::PI * i as f64 / stacks as f64; // 0 to PI
        for j in 0..=slices {
            let theta = 2.0 * std::f64::consts::PI * j as f64 / slices as f64;
            let dir = DVec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            mesh.push_vertex(dir * radius);
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let a = (i * (slices + 1) + j) as u32;
            let b = a + (slices + 1) as u32;

            // Skip degenerate triangles at poles
            if i != 0 {
                mesh.push_triangle(a, b, a + 1);
            }
            if i != stacks - 1 {
                mesh.push_triangle(a + 1, b, b + 1);
            }
        }
    }

    mesh
}
