//! Chunk mesh building: heightfield grids sampled from a noise field.
//!
//! # Invariants
//! - A mesh of resolution `r` has `(r + 1)^2` vertices and `2 * r^2` triangles.
//! - Every index references a vertex of the same mesh.
//! - Building the same coordinate twice yields bit-identical arrays.
//! - Vertex X/Z come from global vertex indices, so chunks sharing an edge
//!   produce identical edge positions.

mod builder;
mod mesh;

pub use builder::ChunkMeshBuilder;
pub use mesh::{Aabb, HeightMesh, MeshError};

pub fn crate_info() -> &'static str {
    "terrastream-mesh v0.1.0"
}
