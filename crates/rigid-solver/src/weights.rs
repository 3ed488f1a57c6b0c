//! Cotangent weights and the discrete Laplacian.
//!
//! For an edge `(i, j)` with opposite angles `α` and `β` the weight is
//! `w_ij = ½ (cot α + cot β)`. Boundary edges carry a single half cotangent;
//! non-manifold edges sum every opposite angle. Obtuse angles give negative
//! contributions, which are kept as-is: the assembled Laplacian is a sum of
//! per-triangle negative semi-definite blocks either way.
//!
//! ```text
//!        c
//!       / \        cot at c weighs edge (a, b)
//!      /   \
//!     a-----b
//!      \   /
//!       \ /        cot at d weighs edge (a, b)
//!        d
//! ```

use rigid_math::DVec3;
use rigid_math::sparse::CsrMatrix;
use rigid_mesh::TriangleMesh;
use rigid_mesh::topology::Topology;

/// One edge of a vertex's cell, seen from the center vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spoke {
    /// The vertex at the other end of the edge.
    pub neighbor: u32,
    /// The edge's cotangent weight.
    pub weight: f64,
}

/// Per-edge cotangent weights plus the per-vertex cell view of them.
#[derive(Debug, Clone)]
pub struct CotangentWeights {
    /// One weight per entry of `Topology::edges`.
    pub edge_weights: Vec<f64>,
    /// For each vertex, its incident edges sorted by neighbor index.
    pub cells: Vec<Vec<Spoke>>,
}

/// Cotangent of the angle at `apex` in the triangle `(a, b, apex)`.
#[inline]
fn cotangent(a: DVec3, b: DVec3, apex: DVec3) -> f64 {
    let u = a - apex;
    let v = b - apex;
    u.dot(v) / u.cross(v).length()
}

/// Area over summed squared edge lengths: `√3/12` for an equilateral
/// triangle, zero for a collinear or collapsed one. Invariant under scaling.
pub fn triangle_quality(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let area = 0.5 * (b - a).cross(c - a).length();
    let edges = (b - a).length_squared() + (c - b).length_squared() + (a - c).length_squared();
    if edges > 0.0 { area / edges } else { 0.0 }
}

impl CotangentWeights {
    /// Computes the weights for `mesh` in its rest shape.
    ///
    /// Triangles whose [`triangle_quality`] is not above
    /// `degenerate_threshold` are skipped.
    pub fn compute(mesh: &TriangleMesh, topology: &Topology, degenerate_threshold: f64) -> Self {
        let positions = mesh.positions();
        let usable: Vec<bool> = (0..mesh.triangle_count())
            .map(|t| {
                let [a, b, c] = mesh.triangle(t).map(|v| positions[v as usize]);
                triangle_quality(a, b, c) > degenerate_threshold
            })
            .collect();

        let mut edge_weights = Vec::with_capacity(topology.edges.len());
        for (e, &[a, b]) in topology.edges.iter().enumerate() {
            let mut w = 0.0;
            for (&tri, &apex) in topology.edge_triangles[e].iter().zip(&topology.edge_opposite[e]) {
                if !usable[tri as usize] {
                    continue;
                }
                w += 0.5
                    * cotangent(
                        positions[a as usize],
                        positions[b as usize],
                        positions[apex as usize],
                    );
            }
            edge_weights.push(w);
        }

        let mut cells: Vec<Vec<Spoke>> = topology
            .vertex_neighbors
            .iter()
            .map(|n| Vec::with_capacity(n.len()))
            .collect();
        // Edges are sorted by (min, max), so each cell ends up sorted by neighbor.
        for (&[a, b], &weight) in topology.edges.iter().zip(&edge_weights) {
            cells[a as usize].push(Spoke { neighbor: b, weight });
            cells[b as usize].push(Spoke { neighbor: a, weight });
        }
        for cell in &mut cells {
            cell.sort_by_key(|s| s.neighbor);
        }

        Self {
            edge_weights,
            cells,
        }
    }

    /// Number of vertices (cells).
    pub fn vertex_count(&self) -> usize {
        self.cells.len()
    }

    /// Assembles the Laplacian `L` with `L_ij = w_ij` and `L_ii = −Σ_j w_ij`.
    pub fn laplacian(&self) -> CsrMatrix {
        let n = self.cells.len();
        let nnz: usize = self.cells.iter().map(|c| c.len() + 1).sum();
        let mut triplets = Vec::with_capacity(nnz);
        for (i, cell) in self.cells.iter().enumerate() {
            let mut diagonal = 0.0;
            for spoke in cell {
                triplets.push((i, spoke.neighbor as usize, spoke.weight));
                diagonal -= spoke.weight;
            }
            triplets.push((i, i, diagonal));
        }
        CsrMatrix::from_triplets(n, n, &triplets)
    }
}

/// Lumped barycentric mass: each vertex receives a third of the area of
/// every incident triangle.
pub fn lumped_mass(mesh: &TriangleMesh) -> Vec<f64> {
    let mut mass = vec![0.0; mesh.vertex_count()];
    for t in 0..mesh.triangle_count() {
        let third = mesh.triangle_area(t) / 3.0;
        for v in mesh.triangle(t) {
            mass[v as usize] += third;
        }
    }
    mass
}
