use std::f32::consts::TAU;

use glam::{EulerRot, Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use terrastream_common::ChunkCoordinate;
use terrastream_mesh::HeightMesh;

use crate::profile::TerrainDetailProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecorationKind {
    Vegetation,
    Rock,
}

/// A request to place one decoration prefab at a pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub kind: DecorationKind,
    pub prefab: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Placement {
    /// Rotation about the vertical axis, in radians.
    pub fn yaw(&self) -> f32 {
        self.rotation.to_euler(EulerRot::YXZ).0
    }
}

/// Samples decoration placements on chunk meshes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailScatterer {
    seed: u64,
}

impl DetailScatterer {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Scatter vegetation and rocks over `mesh` according to `profile`.
    ///
    /// Vegetation gets a random yaw and a scale in `[0.8, 1.2]`; rocks get a
    /// full random orientation and a scale in `[0.5, 1.5]`.
    pub fn scatter(&self, mesh: &HeightMesh, profile: &TerrainDetailProfile) -> Vec<Placement> {
        if let Err(err) = profile.validate() {
            tracing::warn!(coord = %mesh.coord, %err, "skipping decoration scatter");
            return Vec::new();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(chunk_seed(self.seed, mesh.coord));
        let vegetation = profile.vegetation_target(mesh.resolution);
        let rocks = profile.rock_target(mesh.resolution);

        let mut placements = Vec::with_capacity(vegetation.saturating_add(rocks));
        let mut missed = 0usize;

        if !profile.vegetation_candidates.is_empty() {
            for _ in 0..vegetation {
                let Some(position) = sample_surface(&mut rng, mesh) else {
                    missed += 1;
                    continue;
                };
                let prefab = pick(&mut rng, &profile.vegetation_candidates);
                let yaw = rng.gen_range(0.0..TAU);
                placements.push(Placement {
                    kind: DecorationKind::Vegetation,
                    prefab,
                    position,
                    rotation: Quat::from_rotation_y(yaw),
                    scale: rng.gen_range(0.8..=1.2),
                });
            }
        }

        if !profile.rock_candidates.is_empty() {
            for _ in 0..rocks {
                let Some(position) = sample_surface(&mut rng, mesh) else {
                    missed += 1;
                    continue;
                };
                let prefab = pick(&mut rng, &profile.rock_candidates);
                let rotation = Quat::from_euler(
                    EulerRot::YXZ,
                    rng.gen_range(0.0..TAU),
                    rng.gen_range(0.0..TAU),
                    rng.gen_range(0.0..TAU),
                );
                placements.push(Placement {
                    kind: DecorationKind::Rock,
                    prefab,
                    position,
                    rotation,
                    scale: rng.gen_range(0.5..=1.5),
                });
            }
        }

        tracing::trace!(
            coord = %mesh.coord,
            profile = %profile.name,
            placed = placements.len(),
            missed,
            "details scattered"
        );
        placements
    }
}

/// Uniform point in the mesh footprint, dropped onto the surface.
fn sample_surface(rng: &mut ChaCha8Rng, mesh: &HeightMesh) -> Option<Vec3> {
    let bounds = mesh.bounds();
    if bounds.size().x <= 0.0 || bounds.size().z <= 0.0 {
        return None;
    }
    let x = rng.gen_range(bounds.min.x..=bounds.max.x);
    let z = rng.gen_range(bounds.min.z..=bounds.max.z);
    mesh.raycast_down(x, z).map(|y| Vec3::new(x, y, z))
}

fn pick(rng: &mut ChaCha8Rng, candidates: &[String]) -> String {
    candidates[rng.gen_range(0..candidates.len())].clone()
}

/// Per-chunk RNG seed: splitmix64 over the scatter seed and coordinate.
fn chunk_seed(seed: u64, coord: ChunkCoordinate) -> u64 {
    let packed = ((coord.x as u32 as u64) << 32) | coord.z as u32 as u64;
    splitmix64(seed ^ splitmix64(packed))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrastream_mesh::ChunkMeshBuilder;
    use terrastream_noise::{NoiseField, NoiseParameters};

    fn mesh_at(coord: ChunkCoordinate) -> HeightMesh {
        let field = NoiseField::new(NoiseParameters::default()).unwrap();
        ChunkMeshBuilder::new(20, 5.0).unwrap().build(coord, &field, 10.0)
    }

    #[test]
    fn counts_follow_density() {
        let mesh = mesh_at(ChunkCoordinate::ORIGIN);
        let profile = TerrainDetailProfile {
            decoration_density: 1.0,
            ..TerrainDetailProfile::meadow()
        };
        let placements = DetailScatterer::new(1).scatter(&mesh, &profile);
        let veg = placements
            .iter()
            .filter(|p| p.kind == DecorationKind::Vegetation)
            .count();
        let rocks = placements.len() - veg;
        // Heightfield covers its whole footprint, so no samples miss.
        assert_eq!(veg, 20);
        assert_eq!(rocks, 6);
    }

    #[test]
    fn placements_sit_on_surface_within_bounds() {
        let mesh = mesh_at(ChunkCoordinate::new(-3, 2));
        let bounds = mesh.bounds();
        for p in DetailScatterer::new(7).scatter(&mesh, &TerrainDetailProfile::highland()) {
            assert!(bounds.contains_xz(p.position.x, p.position.z));
            let surface = mesh.raycast_down(p.position.x, p.position.z).unwrap();
            assert!((surface - p.position.y).abs() < 1e-4);
            assert!(p.position.y >= bounds.min.y - 1e-4 && p.position.y <= bounds.max.y + 1e-4);
        }
    }

    #[test]
    fn scale_bands_and_candidates() {
        let mesh = mesh_at(ChunkCoordinate::ORIGIN);
        let profile = TerrainDetailProfile {
            decoration_density: 3.0,
            ..TerrainDetailProfile::highland()
        };
        for p in DetailScatterer::new(3).scatter(&mesh, &profile) {
            match p.kind {
                DecorationKind::Vegetation => {
                    assert!((0.8..=1.2).contains(&p.scale));
                    assert!(profile.vegetation_candidates.contains(&p.prefab));
                    // Yaw-only rotation keeps the up axis vertical.
                    assert!((p.rotation * Vec3::Y - Vec3::Y).length() < 1e-4);
                }
                DecorationKind::Rock => {
                    assert!((0.5..=1.5).contains(&p.scale));
                    assert!(profile.rock_candidates.contains(&p.prefab));
                }
            }
        }
    }

    #[test]
    fn scatter_is_reproducible_per_chunk() {
        let mesh = mesh_at(ChunkCoordinate::new(4, 4));
        let scatterer = DetailScatterer::new(99);
        let profile = TerrainDetailProfile::meadow();
        assert_eq!(scatterer.scatter(&mesh, &profile), scatterer.scatter(&mesh, &profile));
    }

    #[test]
    fn different_chunks_scatter_differently() {
        let scatterer = DetailScatterer::new(99);
        let profile = TerrainDetailProfile::meadow();
        let a = scatterer.scatter(&mesh_at(ChunkCoordinate::new(0, 1)), &profile);
        let b = scatterer.scatter(&mesh_at(ChunkCoordinate::new(1, 0)), &profile);
        assert_ne!(a, b);
    }

    #[test]
    fn empty_candidates_place_nothing() {
        let mesh = mesh_at(ChunkCoordinate::ORIGIN);
        let profile = TerrainDetailProfile {
            vegetation_candidates: Vec::new(),
            rock_candidates: Vec::new(),
            ..TerrainDetailProfile::meadow()
        };
        assert!(DetailScatterer::new(0).scatter(&mesh, &profile).is_empty());
    }

    #[test]
    fn zero_density_places_nothing() {
        let mesh = mesh_at(ChunkCoordinate::ORIGIN);
        let profile = TerrainDetailProfile {
            decoration_density: 0.0,
            ..TerrainDetailProfile::meadow()
        };
        assert!(DetailScatterer::new(0).scatter(&mesh, &profile).is_empty());
    }

    #[test]
    fn invalid_density_places_nothing() {
        let mesh = mesh_at(ChunkCoordinate::ORIGIN);
        for value in [f32::INFINITY, f32::NAN, -1.0, 1.0e30] {
            let profile = TerrainDetailProfile {
                decoration_density: value,
                ..TerrainDetailProfile::meadow()
            };
            assert!(DetailScatterer::new(0).scatter(&mesh, &profile).is_empty());
        }
    }

    #[test]
    fn vegetation_yaw_is_recoverable() {
        let p = Placement {
            kind: DecorationKind::Vegetation,
            prefab: "pine".into(),
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_y(1.25),
            scale: 1.0,
        };
        assert!((p.yaw() - 1.25).abs() < 1e-5);
    }
}
