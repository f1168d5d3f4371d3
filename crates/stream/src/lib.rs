//! Streaming: observer-driven terrain chunk residency.
//!
//! # Invariants
//! - Exactly one chunk per resident coordinate; only `recompute` writes the
//!   resident map.
//! - After a recompute the resident set is exactly the coordinates whose
//!   center lies within the admission radius of the observer (modulo the
//!   optional eviction margin).
//! - A recompute runs to completion in the calling thread; parallel builds
//!   only share immutable state and are applied in lattice order.

mod chunk;
mod config;
mod selector;
mod streamer;
mod timer;

pub use chunk::TerrainChunk;
pub use config::{ConfigError, TerrainConfig};
pub use selector::{LandmarkSelector, ProfileSelector};
pub use streamer::{ObserverProvider, StreamStats, StreamUpdate, TerrainStreamer};
pub use timer::RecomputeTimer;

pub fn crate_info() -> &'static str {
    "terrastream-stream v0.1.0"
}
