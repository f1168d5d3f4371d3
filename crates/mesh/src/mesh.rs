use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use terrastream_common::ChunkCoordinate;

/// Errors from mesh construction and validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("resolution must be at least 1")]
    ZeroResolution,
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Whether a point lies inside the box footprint on X and Z.
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// A chunk's heightfield mesh in world space.
///
/// Vertices are stored row-major: index `iz * (resolution + 1) + ix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightMesh {
    pub coord: ChunkCoordinate,
    pub resolution: u32,
    pub cell_size: f32,
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl HeightMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn row_len(&self) -> usize {
        self.resolution as usize + 1
    }

    /// Vertex at grid position `(ix, iz)`, if inside the grid.
    pub fn vertex(&self, ix: u32, iz: u32) -> Option<Vec3> {
        if ix > self.resolution || iz > self.resolution {
            return None;
        }
        self.positions
            .get(iz as usize * self.row_len() + ix as usize)
            .copied()
    }

    /// Bounds over all vertices. An empty mesh has a zero box at the origin.
    pub fn bounds(&self) -> Aabb {
        let Some(first) = self.positions.first() else {
            return Aabb {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
        };
        let (min, max) = self
            .positions
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Aabb { min, max }
    }

    /// Check that every triangle index references an existing vertex.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.positions.len();
        match self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            Some(&index) => Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }

    /// Smooth per-vertex normals from area-weighted face normals.
    pub fn compute_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect()
    }

    /// Drop a ray straight down from above the mesh at `(x, z)` and return
    /// the height of the first surface hit.
    ///
    /// Returns `None` when the point lies outside the mesh footprint.
    pub fn raycast_down(&self, x: f32, z: f32) -> Option<f32> {
        let bounds = self.bounds();
        if self.resolution == 0 || !bounds.contains_xz(x, z) {
            return None;
        }
        let max_cell = self.resolution as usize - 1;
        let ix = (((x - bounds.min.x) / self.cell_size).floor().max(0.0) as usize).min(max_cell);
        let iz = (((z - bounds.min.z) / self.cell_size).floor().max(0.0) as usize).min(max_cell);

        let origin = Vec3::new(x, bounds.max.y + 1.0, z);
        let dir = Vec3::NEG_Y;
        let first = (iz * self.resolution as usize + ix) * 6;
        self.indices
            .get(first..first + 6)?
            .chunks_exact(3)
            .filter_map(|tri| {
                ray_triangle(
                    origin,
                    dir,
                    self.positions[tri[0] as usize],
                    self.positions[tri[1] as usize],
                    self.positions[tri[2] as usize],
                )
            })
            .min_by(|a, b| a.total_cmp(b))
            .map(|t| origin.y - t)
    }
}

/// Möller-Trumbore intersection, double sided. Returns the ray parameter.
fn ray_triangle(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    const DET_EPS: f32 = 1e-9;
    const EPS: f32 = 1e-4;
    let e1 = b - a;
    let e2 = c - a;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < DET_EPS {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv;
    if !(-EPS..=1.0 + EPS).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv;
    if v < -EPS || u + v > 1.0 + EPS {
        return None;
    }
    let t = e2.dot(q) * inv;
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat 1x1 quad at height `y`, wound like the chunk builder.
    fn flat_quad(y: f32) -> HeightMesh {
        HeightMesh {
            coord: ChunkCoordinate::ORIGIN,
            resolution: 1,
            cell_size: 2.0,
            positions: vec![
                Vec3::new(0.0, y, 0.0),
                Vec3::new(2.0, y, 0.0),
                Vec3::new(0.0, y, 2.0),
                Vec3::new(2.0, y, 2.0),
            ],
            uvs: vec![Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE],
            indices: vec![0, 2, 1, 1, 2, 3],
        }
    }

    #[test]
    fn bounds_cover_vertices() {
        let mesh = flat_quad(3.0);
        let b = mesh.bounds();
        assert_eq!(b.min, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(b.max, Vec3::new(2.0, 3.0, 2.0));
        assert_eq!(b.size(), Vec3::new(2.0, 0.0, 2.0));
    }

    #[test]
    fn raycast_hits_flat_surface() {
        let mesh = flat_quad(3.0);
        let y = mesh.raycast_down(0.5, 1.5).unwrap();
        assert!((y - 3.0).abs() < 1e-5);
        // Exactly on the shared diagonal and on the far corner.
        assert!(mesh.raycast_down(1.0, 1.0).is_some());
        assert!(mesh.raycast_down(2.0, 2.0).is_some());
    }

    #[test]
    fn raycast_misses_outside_footprint() {
        let mesh = flat_quad(0.0);
        assert_eq!(mesh.raycast_down(-0.1, 1.0), None);
        assert_eq!(mesh.raycast_down(1.0, 2.5), None);
    }

    #[test]
    fn raycast_on_slope_interpolates() {
        let mut mesh = flat_quad(0.0);
        // Raise the +X edge to 2: plane y = x.
        mesh.positions[1].y = 2.0;
        mesh.positions[3].y = 2.0;
        let y = mesh.raycast_down(0.5, 0.25).unwrap();
        assert!((y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn normals_point_up_on_flat_mesh() {
        let mesh = flat_quad(1.0);
        for n in mesh.compute_normals() {
            assert!((n - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn validate_detects_bad_index() {
        let mut mesh = flat_quad(0.0);
        assert!(mesh.validate().is_ok());
        mesh.indices[4] = 9;
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                index: 9,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn vertex_lookup() {
        let mesh = flat_quad(0.0);
        assert_eq!(mesh.vertex(1, 1), Some(Vec3::new(2.0, 0.0, 2.0)));
        assert_eq!(mesh.vertex(2, 0), None);
    }
}
