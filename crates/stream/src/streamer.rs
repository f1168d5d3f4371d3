use std::collections::HashMap;
use std::time::{Duration, Instant};

use glam::Vec3;
use rayon::prelude::*;
use serde::Serialize;
use terrastream_common::{ChunkCoordinate, ChunkGrid};
use terrastream_mesh::ChunkMeshBuilder;
use terrastream_noise::NoiseField;
use terrastream_scatter::DetailScatterer;

use crate::chunk::TerrainChunk;
use crate::config::{ConfigError, TerrainConfig};
use crate::selector::ProfileSelector;
use crate::timer::RecomputeTimer;

/// Admission bursts larger than this are logged as likely frame stalls.
const BURST_WARN_CHUNKS: usize = 16;

/// Host-side source of the observer position, polled by the streamer.
pub trait ObserverProvider {
    fn observer_position(&self) -> Vec3;
}

impl<F> ObserverProvider for F
where
    F: Fn() -> Vec3,
{
    fn observer_position(&self) -> Vec3 {
        self()
    }
}

/// Result of one recompute: coordinates that became resident and the chunks
/// that were retired. Evicted chunks are handed back so the caller can
/// release whatever it mirrored for them.
#[derive(Debug, Default)]
pub struct StreamUpdate {
    pub admitted: Vec<ChunkCoordinate>,
    pub evicted: Vec<TerrainChunk>,
}

impl StreamUpdate {
    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty() && self.evicted.is_empty()
    }

    pub fn evicted_coords(&self) -> Vec<ChunkCoordinate> {
        self.evicted.iter().map(|c| c.coord).collect()
    }
}

/// Statistics from the last recompute.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StreamStats {
    pub chunks_admitted: usize,
    pub chunks_evicted: usize,
    pub resident_chunks: usize,
    pub resident_decorations: usize,
    pub recompute_time: Duration,
    pub recompute_count: u64,
}

/// Everything needed to build one chunk. Shared read-only across builds.
struct ChunkFactory {
    grid: ChunkGrid,
    field: NoiseField,
    builder: ChunkMeshBuilder,
    scatterer: DetailScatterer,
    selector: Box<dyn ProfileSelector>,
    height_amplitude: f32,
}

impl ChunkFactory {
    fn build(&self, coord: ChunkCoordinate) -> TerrainChunk {
        let mesh = self.builder.build(coord, &self.field, self.height_amplitude);
        let profile = self.selector.select(self.grid.center(coord));
        let placements = self.scatterer.scatter(&mesh, &profile);
        TerrainChunk::new(mesh, profile, placements)
    }
}

/// Keeps the chunks around an observer resident.
///
/// A chunk is resident iff its center lies closer than `1.5 * local_radius`
/// to the observer on the XZ plane (eviction waits for `evict_margin` more).
/// The resident map holds at most one chunk per coordinate and is only
/// written by [`TerrainStreamer::recompute`].
pub struct TerrainStreamer {
    config: TerrainConfig,
    grid: ChunkGrid,
    factory: ChunkFactory,
    chunks: HashMap<ChunkCoordinate, TerrainChunk>,
    last_recompute: Option<Vec3>,
    stats: StreamStats,
    timer: RecomputeTimer,
}

impl TerrainStreamer {
    /// Validate `config` and set up the generator. Invalid configuration is
    /// fatal; nothing is built until the first recompute.
    pub fn new(
        config: TerrainConfig,
        selector: impl ProfileSelector + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let builder = ChunkMeshBuilder::new(
            config.resolution,
            config.local_radius * 2.0 / config.resolution as f32,
        )?;
        let grid = *builder.grid();
        let field = NoiseField::new(config.noise_parameters())?;

        tracing::info!(
            local_radius = config.local_radius,
            resolution = config.resolution,
            cell_size = grid.cell_size(),
            admit_radius = config.admit_radius(),
            evict_radius = config.evict_radius(),
            "terrain streamer configured"
        );

        Ok(Self {
            factory: ChunkFactory {
                grid,
                field,
                builder,
                scatterer: DetailScatterer::new(config.seed as u64),
                selector: Box::new(selector),
                height_amplitude: config.max_height,
            },
            grid,
            config,
            chunks: HashMap::new(),
            last_recompute: None,
            stats: StreamStats::default(),
            timer: RecomputeTimer::default(),
        })
    }

    /// Start streaming around `observer`. Always recomputes.
    pub fn initialize(&mut self, observer: Vec3) -> StreamUpdate {
        self.recompute(observer)
    }

    /// Read the observer from `provider` and react as [`Self::observer_moved`].
    pub fn poll(&mut self, provider: &impl ObserverProvider) -> StreamUpdate {
        self.observer_moved(provider.observer_position())
    }

    /// Recompute only if the observer moved more than `update_threshold`
    /// (XZ plane) since the last recompute. Before the first recompute every
    /// call recomputes.
    pub fn observer_moved(&mut self, position: Vec3) -> StreamUpdate {
        let moved = self
            .last_recompute
            .map(|last| horizontal_distance(last, position));
        match moved {
            Some(d) if d <= self.config.update_threshold => StreamUpdate::default(),
            _ => self.recompute(position),
        }
    }

    /// Evict out-of-range chunks, then admit in-range coordinates that are
    /// not yet resident. Runs to completion; calling it again for the same
    /// position changes nothing.
    pub fn recompute(&mut self, observer: Vec3) -> StreamUpdate {
        let _span = tracing::info_span!("terrain_recompute").entered();
        let start = Instant::now();

        let evict_radius = self.config.evict_radius();
        let mut to_evict: Vec<ChunkCoordinate> = self
            .chunks
            .keys()
            .filter(|c| self.grid.center_distance(**c, observer) >= evict_radius)
            .copied()
            .collect();
        to_evict.sort();

        let evicted: Vec<TerrainChunk> = to_evict
            .iter()
            .filter_map(|c| self.chunks.remove(c))
            .inspect(|chunk| {
                tracing::debug!(
                    coord = %chunk.coord,
                    decorations = chunk.decoration_count(),
                    "evicting chunk"
                );
            })
            .collect();

        let to_admit = self.admission_candidates(observer);
        if to_admit.len() > BURST_WARN_CHUNKS {
            tracing::warn!(
                chunks = to_admit.len(),
                "large admission burst; recompute will stall the caller"
            );
        }

        let built: Vec<TerrainChunk> = if self.config.parallel_build && to_admit.len() > 1 {
            let factory = &self.factory;
            to_admit.par_iter().map(|c| factory.build(*c)).collect()
        } else {
            to_admit.iter().map(|c| self.factory.build(*c)).collect()
        };

        for chunk in built {
            tracing::debug!(
                coord = %chunk.coord,
                profile = %chunk.profile.name,
                decorations = chunk.decoration_count(),
                "admitting chunk"
            );
            let previous = self.chunks.insert(chunk.coord, chunk);
            debug_assert!(previous.is_none(), "chunk admitted twice");
        }

        self.last_recompute = Some(observer);
        let elapsed = start.elapsed();
        self.timer.record(elapsed);
        self.stats = StreamStats {
            chunks_admitted: to_admit.len(),
            chunks_evicted: evicted.len(),
            resident_chunks: self.chunks.len(),
            resident_decorations: self.chunks.values().map(|c| c.decoration_count()).sum(),
            recompute_time: elapsed,
            recompute_count: self.stats.recompute_count + 1,
        };

        tracing::trace!(
            admitted = to_admit.len(),
            evicted = evicted.len(),
            resident = self.chunks.len(),
            "terrain recompute complete"
        );

        StreamUpdate {
            admitted: to_admit,
            evicted,
        }
    }

    /// Coordinates on the candidate lattice around the observer's chunk that
    /// are in admission range and not resident, in lattice order.
    fn admission_candidates(&self, observer: Vec3) -> Vec<ChunkCoordinate> {
        let admit_radius = self.config.admit_radius();
        let center = self.grid.position_to_chunk(observer);
        let r = self.config.lattice_radius();

        let mut result = Vec::new();
        for dz in -r..=r {
            for dx in -r..=r {
                // Cells past the edge of the i32 grid do not exist.
                let Some(coord) = center.checked_offset(dx, dz) else {
                    continue;
                };
                if !self.chunks.contains_key(&coord)
                    && self.grid.center_distance(coord, observer) < admit_radius
                {
                    result.push(coord);
                }
            }
        }
        result
    }

    /// Release every resident chunk, e.g. on shutdown.
    pub fn clear(&mut self) -> Vec<TerrainChunk> {
        let mut chunks: Vec<TerrainChunk> = self.chunks.drain().map(|(_, c)| c).collect();
        chunks.sort_by_key(|c| c.coord);
        self.last_recompute = None;
        chunks
    }

    pub fn is_resident(&self, coord: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn chunk(&self, coord: ChunkCoordinate) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    /// Resident coordinates in sorted order.
    pub fn resident_coords(&self) -> Vec<ChunkCoordinate> {
        let mut coords: Vec<ChunkCoordinate> = self.chunks.keys().copied().collect();
        coords.sort();
        coords
    }

    pub fn resident_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.values()
    }

    /// Observer position used by the last recompute.
    pub fn last_recompute(&self) -> Option<Vec3> {
        self.last_recompute
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    pub fn noise_field(&self) -> &NoiseField {
        &self.factory.field
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn timer(&self) -> &RecomputeTimer {
        &self.timer
    }
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
