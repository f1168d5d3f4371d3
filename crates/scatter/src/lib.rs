//! Detail scattering: decoration placements sampled on a chunk surface.
//!
//! # Invariants
//! - The requested count is a target; samples that miss the surface are
//!   skipped, never retried.
//! - Placements for a chunk depend only on the scatter seed, the chunk
//!   coordinate, its mesh and the profile.

mod profile;
mod scatter;

pub use profile::{MAX_DECORATION_DENSITY, ProfileError, TerrainDetailProfile};
pub use scatter::{DecorationKind, DetailScatterer, Placement};
