use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Integer position of a chunk on the infinite terrain grid (XZ plane).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ChunkCoordinate {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoordinate {
    pub const ORIGIN: Self = Self { x: 0, z: 0 };

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Offset this coordinate by a number of chunks on each axis, saturating
    /// at the edge of the `i32` grid.
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }

    /// Offset this coordinate, or `None` if either axis leaves the `i32` grid.
    pub const fn checked_offset(self, dx: i32, dz: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.z.checked_add(dz)) {
            (Some(x), Some(z)) => Some(Self { x, z }),
            _ => None,
        }
    }

    /// The four laterally adjacent coordinates (+X, -X, +Z, -Z).
    pub fn neighbors(self) -> [Self; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }
}

impl std::fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// World frame shared by mesh building and streaming.
///
/// A chunk spans `resolution` cells of `cell_size` world units on each
/// horizontal axis. Its origin is its minimum X/Z corner; Y is ignored for
/// partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkGrid {
    resolution: u32,
    cell_size: f32,
}

impl ChunkGrid {
    /// Create a grid frame.
    ///
    /// Panics if `resolution` is zero or `cell_size` is not a positive finite
    /// number; configuration validation rejects those before a grid is built.
    pub fn new(resolution: u32, cell_size: f32) -> Self {
        assert!(resolution > 0, "resolution must be at least 1");
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive"
        );
        Self {
            resolution,
            cell_size,
        }
    }

    /// Grid frame for a local terrain radius: each chunk is `2 * local_radius`
    /// wide, split into `resolution` cells.
    pub fn from_radius(local_radius: f32, resolution: u32) -> Self {
        Self::new(resolution, local_radius * 2.0 / resolution as f32)
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Width of one chunk in world units.
    pub fn chunk_size(&self) -> f32 {
        self.resolution as f32 * self.cell_size
    }

    /// World coordinate of a global vertex index along one axis.
    ///
    /// Neighboring chunks share edge vertices with the same global index, so
    /// computing positions from it keeps seams bit-identical.
    pub fn vertex_world(&self, global_index: i64) -> f64 {
        global_index as f64 * self.cell_size as f64
    }

    /// Global vertex index of the first vertex of a chunk along one axis.
    pub fn first_vertex_index(&self, chunk: i32) -> i64 {
        chunk as i64 * self.resolution as i64
    }

    /// Minimum X/Z corner of a chunk at Y = 0.
    pub fn origin(&self, coord: ChunkCoordinate) -> Vec3 {
        Vec3::new(
            self.vertex_world(self.first_vertex_index(coord.x)) as f32,
            0.0,
            self.vertex_world(self.first_vertex_index(coord.z)) as f32,
        )
    }

    /// Center of a chunk footprint at Y = 0.
    pub fn center(&self, coord: ChunkCoordinate) -> Vec3 {
        let half = self.chunk_size() * 0.5;
        self.origin(coord) + Vec3::new(half, 0.0, half)
    }

    /// Chunk containing a world position (floor division on X and Z).
    pub fn position_to_chunk(&self, pos: Vec3) -> ChunkCoordinate {
        let size = self.chunk_size();
        ChunkCoordinate {
            x: (pos.x / size).floor() as i32,
            z: (pos.z / size).floor() as i32,
        }
    }

    /// Horizontal (XZ) distance from a chunk center to a point.
    pub fn center_distance(&self, coord: ChunkCoordinate, pos: Vec3) -> f32 {
        let c = self.center(coord);
        let dx = c.x - pos.x;
        let dz = c.z - pos.z;
        (dx * dx + dz * dz).sqrt()
    }
}
