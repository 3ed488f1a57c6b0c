//! Mesh topology preprocessing.
//!
//! Builds adjacency data structures from the triangle index buffer:
//! per-vertex neighbors and incident triangles, the unique undirected
//! edge list, and for each edge the vertices opposite it (the apexes
//! whose angles define the cotangent weight).
//!
//! Construction is a pure, deterministic function of the index buffer:
//! edges are ordered lexicographically by `(v_min, v_max)`.

use std::collections::{BTreeMap, VecDeque};

use rigid_types::{RigidError, RigidResult};

use crate::mesh::TriangleMesh;

/// Precomputed topology information for a triangle mesh.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Number of vertices the topology was built for.
    pub vertex_count: usize,

    /// For each vertex, the list of triangles that contain it.
    pub vertex_triangles: Vec<Vec<u32>>,

    /// For each vertex, its edge-connected neighbors (sorted, unique).
    pub vertex_neighbors: Vec<Vec<u32>>,

    /// Unique edges as `[v_min, v_max]` pairs, sorted.
    pub edges: Vec<[u32; 2]>,

    /// For each edge, the adjacent triangles.
    /// Boundary edges have exactly 1 adjacent triangle.
    pub edge_triangles: Vec<Vec<u32>>,

    /// For each edge, the vertex opposite it in each adjacent triangle
    /// (same order as `edge_triangles`).
    pub edge_opposite: Vec<Vec<u32>>,
}

impl Topology {
    /// Build topology from a triangle mesh.
    ///
    /// Fails with [`RigidError::InvalidTopology`] if the mesh does not validate.
    pub fn build(mesh: &TriangleMesh) -> RigidResult<Self> {
        mesh.validate()?;
        Self::from_indices(mesh.vertex_count(), &mesh.indices)
    }

    /// Build topology from a vertex count and a flat triangle index list.
    pub fn from_indices(vertex_count: usize, indices: &[u32]) -> RigidResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(RigidError::InvalidTopology(
                "Index count is not divisible by 3".into(),
            ));
        }

        let tri_count = indices.len() / 3;
        let mut vertex_triangles: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];

        // Key: (min_vertex, max_vertex) to canonicalize edge direction.
        // Value: (triangle, opposite vertex) pairs.
        let mut edge_map: BTreeMap<(u32, u32), Vec<(u32, u32)>> = BTreeMap::new();

        for t in 0..tri_count {
            let tri = [indices[t * 3], indices[t * 3 + 1], indices[t * 3 + 2]];
            for &v in &tri {
                if v as usize >= vertex_count {
                    return Err(RigidError::InvalidTopology(format!(
                        "Triangle {t} references vertex {v} (vertex count: {vertex_count})"
                    )));
                }
            }
            let [a, b, c] = tri;
            if a == b || b == c || a == c {
                return Err(RigidError::InvalidTopology(format!(
                    "Triangle {t} has repeated vertex indices: [{a}, {b}, {c}]"
                )));
            }

            vertex_triangles[a as usize].push(t as u32);
            vertex_triangles[b as usize].push(t as u32);
            vertex_triangles[c as usize].push(t as u32);

            for (v0, v1, apex) in [(a, b, c), (b, c, a), (c, a, b)] {
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                edge_map.entry(key).or_default().push((t as u32, apex));
            }
        }

        let mut edges = Vec::with_capacity(edge_map.len());
        let mut edge_triangles = Vec::with_capacity(edge_map.len());
        let mut edge_opposite = Vec::with_capacity(edge_map.len());
        let mut vertex_neighbors: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];

        for ((v0, v1), incident) in edge_map {
            edges.push([v0, v1]);
            edge_triangles.push(incident.iter().map(|&(t, _)| t).collect());
            edge_opposite.push(incident.iter().map(|&(_, apex)| apex).collect());
            vertex_neighbors[v0 as usize].push(v1);
            vertex_neighbors[v1 as usize].push(v0);
        }

        for neighbors in &mut vertex_neighbors {
            neighbors.sort_unstable();
        }

        Ok(Self {
            vertex_count,
            vertex_triangles,
            vertex_neighbors,
            edges,
            edge_triangles,
            edge_opposite,
        })
    }

    /// Returns the 1-ring vertex neighborhood of vertex `v`.
    pub fn one_ring(&self, v: u32) -> &[u32] {
        &self.vertex_neighbors[v as usize]
    }

    /// Index of the edge joining `a` and `b`, if it exists.
    pub fn edge_index(&self, a: u32, b: u32) -> Option<usize> {
        let key = if a < b { [a, b] } else { [b, a] };
        self.edges.binary_search(&key).ok()
    }

    /// Returns the number of boundary edges (edges with only 1 adjacent triangle).
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_triangles
            .iter()
            .filter(|tris| tris.len() == 1)
            .count()
    }

    /// Returns the number of edges shared by more than two triangles.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_triangles
            .iter()
            .filter(|tris| tris.len() > 2)
            .count()
    }

    /// Returns true if the mesh is closed (no boundary edges).
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }

    /// Labels edge-connected components.
    ///
    /// Returns `(labels, count)` where `labels[v]` is the component of vertex
    /// `v`. Vertices not referenced by any triangle form singleton components.
    pub fn connected_components(&self) -> (Vec<usize>, usize) {
        let mut labels = vec![usize::MAX; self.vertex_count];
        let mut count = 0;
        let mut queue = VecDeque::new();

        for start in 0..self.vertex_count {
            if labels[start] != usize::MAX {
                continue;
            }
            labels[start] = count;
            queue.push_back(start);
            while let Some(v) = queue.pop_front() {
                for &n in &self.vertex_neighbors[v] {
                    let n = n as usize;
                    if labels[n] == usize::MAX {
                        labels[n] = count;
                        queue.push_back(n);
                    }
                }
            }
            count += 1;
        }

        (labels, count)
    }
}
