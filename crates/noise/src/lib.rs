//! Noise field: deterministic 2D fractal height function.
//!
//! # Invariants
//! - `height` is a pure function of the world position and the parameters it
//!   was built with; parameters are never mutated after construction.
//! - Output is always in `[0, 1]`.
//! - The base primitive is continuous, so neighboring chunks sampled in the
//!   same world frame meet exactly.

mod field;

pub use field::{NoiseError, NoiseField, NoiseParameters};

pub fn crate_info() -> &'static str {
    "terrastream-noise v0.1.0"
}
