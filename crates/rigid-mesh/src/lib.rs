//! # rigid-mesh
//!
//! Triangle mesh representation with Structure-of-Arrays (SoA) layout
//! and the topology preprocessing the solver builds on.
//!
//! ## Key Types
//!
//! - [`TriangleMesh`]: The rest shape: SoA positions plus the triangle index buffer.
//! - [`Topology`]: Adjacency queries (vertex neighbors, unique edges, opposite vertices).
//! - [`SurfaceMapping`]: Binds a dense point set to a coarse control mesh.
//! - Procedural generators for test and benchmark meshes (quad grids, UV spheres).

pub mod generators;
pub mod mapping;
pub mod mesh;
pub mod normals;
pub mod topology;

pub use mapping::SurfaceMapping;
pub use mesh::TriangleMesh;
pub use topology::Topology;
