//! Shared types used by every terrastream crate.
//!
//! # Invariants
//! - Chunk coordinates are plain values; two coordinates are the same chunk iff
//!   their `x` and `z` are equal.
//! - All world-space math for chunk footprints goes through [`ChunkGrid`] so the
//!   builder and the streamer agree on where a chunk lives.

mod coords;
mod types;

pub use coords::{ChunkCoordinate, ChunkGrid};
pub use types::DecorationHandle;
