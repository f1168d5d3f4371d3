use std::sync::Arc;

use terrastream_common::{ChunkCoordinate, DecorationHandle};
use terrastream_mesh::HeightMesh;
use terrastream_scatter::{Placement, TerrainDetailProfile};

/// A resident terrain chunk and everything it owns.
///
/// `decorations[i]` is the handle for `placements[i]`. Dropping the chunk
/// releases its mesh and handles; the render layer mirrors that by
/// despawning whatever it created for them.
#[derive(Debug, Clone)]
pub struct TerrainChunk {
    pub coord: ChunkCoordinate,
    pub mesh: HeightMesh,
    pub profile: Arc<TerrainDetailProfile>,
    pub placements: Vec<Placement>,
    pub decorations: Vec<DecorationHandle>,
}

impl TerrainChunk {
    pub fn new(
        mesh: HeightMesh,
        profile: Arc<TerrainDetailProfile>,
        placements: Vec<Placement>,
    ) -> Self {
        let decorations = placements.iter().map(|_| DecorationHandle::new()).collect();
        Self {
            coord: mesh.coord,
            mesh,
            profile,
            placements,
            decorations,
        }
    }

    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    /// Iterate placements paired with their handles.
    pub fn decorated(&self) -> impl Iterator<Item = (&DecorationHandle, &Placement)> {
        self.decorations.iter().zip(&self.placements)
    }
}
