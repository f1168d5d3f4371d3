use glam::{Vec2, Vec3};
use terrastream_common::{ChunkCoordinate, ChunkGrid};
use terrastream_noise::NoiseField;

use crate::mesh::{HeightMesh, MeshError};

/// Builds chunk heightfield meshes on a fixed grid frame.
#[derive(Debug, Clone, Copy)]
pub struct ChunkMeshBuilder {
    grid: ChunkGrid,
}

impl ChunkMeshBuilder {
    /// Create a builder for `resolution` cells of `cell_size` world units per chunk side.
    pub fn new(resolution: u32, cell_size: f32) -> Result<Self, MeshError> {
        if resolution == 0 {
            return Err(MeshError::ZeroResolution);
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(MeshError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            grid: ChunkGrid::new(resolution, cell_size),
        })
    }

    pub fn from_grid(grid: ChunkGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    pub fn resolution(&self) -> u32 {
        self.grid.resolution()
    }

    /// Build the mesh for one chunk.
    ///
    /// Each vertex height is `field.height(x, z) * height_amplitude`. Two
    /// triangles per cell, wound counter-clockwise seen from +Y.
    pub fn build(
        &self,
        coord: ChunkCoordinate,
        field: &NoiseField,
        height_amplitude: f32,
    ) -> HeightMesh {
        let _span = tracing::debug_span!("build_chunk_mesh", %coord).entered();

        let res = self.grid.resolution();
        let row = res as usize + 1;
        let first_x = self.grid.first_vertex_index(coord.x);
        let first_z = self.grid.first_vertex_index(coord.z);

        let mut positions = Vec::with_capacity(row * row);
        let mut uvs = Vec::with_capacity(row * row);
        for iz in 0..=res {
            let wz = self.grid.vertex_world(first_z + iz as i64);
            for ix in 0..=res {
                let wx = self.grid.vertex_world(first_x + ix as i64);
                let y = field.height(wx, wz) as f32 * height_amplitude;
                positions.push(Vec3::new(wx as f32, y, wz as f32));
                uvs.push(Vec2::new(ix as f32 / res as f32, iz as f32 / res as f32));
            }
        }

        let mut indices = Vec::with_capacity(res as usize * res as usize * 6);
        let row = row as u32;
        for iz in 0..res {
            for ix in 0..res {
                let a = iz * row + ix;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        tracing::trace!(
            vertices = positions.len(),
            triangles = indices.len() / 3,
            "chunk mesh built"
        );

        HeightMesh {
            coord,
            resolution: res,
            cell_size: self.grid.cell_size(),
            positions,
            uvs,
            indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrastream_noise::NoiseParameters;

    fn scenario_field() -> NoiseField {
        NoiseField::new(NoiseParameters {
            noise_scale: 20.0,
            octaves: 1,
            persistence: 0.5,
            lacunarity: 2.0,
            height_amplitude: 5.0,
            seed: 0,
        })
        .unwrap()
    }

    fn scenario_builder() -> ChunkMeshBuilder {
        // localRadius = 20, resolution = 4 -> cell size 10
        ChunkMeshBuilder::from_grid(ChunkGrid::from_radius(20.0, 4))
    }

    #[test]
    fn rejects_zero_resolution() {
        assert_eq!(ChunkMeshBuilder::new(0, 1.0).unwrap_err(), MeshError::ZeroResolution);
        assert_eq!(
            ChunkMeshBuilder::new(4, -1.0).unwrap_err(),
            MeshError::InvalidCellSize(-1.0)
        );
    }

    #[test]
    fn scenario_counts_and_origin_height() {
        let field = scenario_field();
        let mesh = scenario_builder().build(ChunkCoordinate::ORIGIN, &field, 5.0);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.indices.len(), 96);
        assert_eq!(mesh.positions[0].y, field.gradient(0.0, 0.0) as f32 * 5.0);
    }

    #[test]
    fn counts_hold_for_any_resolution() {
        let field = NoiseField::new(NoiseParameters::default()).unwrap();
        for res in [1u32, 2, 3, 7, 16] {
            let mesh = ChunkMeshBuilder::new(res, 1.5)
                .unwrap()
                .build(ChunkCoordinate::new(-2, 5), &field, 10.0);
            let r = res as usize;
            assert_eq!(mesh.vertex_count(), (r + 1) * (r + 1));
            assert_eq!(mesh.triangle_count(), r * r * 2);
            assert_eq!(mesh.indices.len(), r * r * 6);
            assert!(mesh.validate().is_ok());
        }
    }

    #[test]
    fn build_is_deterministic() {
        let field = NoiseField::new(NoiseParameters::default()).unwrap();
        let builder = ChunkMeshBuilder::new(8, 2.5).unwrap();
        let coord = ChunkCoordinate::new(3, -4);
        let a = builder.build(coord, &field, 7.0);
        let b = builder.build(coord, &field, 7.0);
        let bits = |m: &HeightMesh| {
            m.positions
                .iter()
                .flat_map(|p| p.to_array())
                .chain(m.uvs.iter().flat_map(|uv| uv.to_array()))
                .map(f32::to_bits)
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn adjacent_chunks_share_edges_exactly() {
        let field = NoiseField::new(NoiseParameters::default()).unwrap();
        let builder = ChunkMeshBuilder::from_grid(ChunkGrid::from_radius(13.0, 6));
        let res = builder.resolution();
        let here = ChunkCoordinate::new(-1, 2);
        let mesh = builder.build(here, &field, 9.0);

        let east = builder.build(here.offset(1, 0), &field, 9.0);
        let north = builder.build(here.offset(0, 1), &field, 9.0);
        for i in 0..=res {
            assert_eq!(mesh.vertex(res, i), east.vertex(0, i));
            assert_eq!(mesh.vertex(i, res), north.vertex(i, 0));
        }
    }

    #[test]
    fn uvs_span_unit_square() {
        let field = scenario_field();
        let mesh = scenario_builder().build(ChunkCoordinate::new(5, 5), &field, 5.0);
        assert_eq!(mesh.uvs.first(), Some(&Vec2::ZERO));
        assert_eq!(mesh.uvs.last(), Some(&Vec2::ONE));
    }

    #[test]
    fn footprint_starts_at_chunk_origin() {
        let field = scenario_field();
        let builder = scenario_builder();
        let coord = ChunkCoordinate::new(2, -1);
        let mesh = builder.build(coord, &field, 5.0);
        let bounds = mesh.bounds();
        assert_eq!(bounds.min.x, 80.0);
        assert_eq!(bounds.min.z, -40.0);
        assert_eq!(bounds.size().x, builder.grid().chunk_size());
    }

    #[test]
    fn normals_point_up() {
        let field = NoiseField::new(NoiseParameters::default()).unwrap();
        let mesh = ChunkMeshBuilder::new(8, 4.0)
            .unwrap()
            .build(ChunkCoordinate::ORIGIN, &field, 3.0);
        assert!(mesh.compute_normals().iter().all(|n| n.y > 0.0));
    }

    #[test]
    fn raycast_matches_vertex_heights() {
        let field = NoiseField::new(NoiseParameters::default()).unwrap();
        let mesh = ChunkMeshBuilder::new(4, 2.0)
            .unwrap()
            .build(ChunkCoordinate::ORIGIN, &field, 6.0);
        let v = mesh.vertex(1, 2).unwrap();
        let hit = mesh.raycast_down(v.x, v.z).unwrap();
        assert!((hit - v.y).abs() < 1e-4);
    }
}
