use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Errors from constructing a noise field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NoiseError {
    #[error("noise scale must be positive and finite, got {0}")]
    InvalidScale(f64),
    #[error("octave count must be at least 1")]
    InvalidOctaves,
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidFalloff { name: &'static str, value: f64 },
}

/// Parameters driving height synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParameters {
    /// World units per unit of base noise frequency.
    pub noise_scale: f64,
    /// Number of layered octaves.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// World-space height of a sample at 1.0.
    pub height_amplitude: f64,
    /// Permutation seed for the gradient primitive.
    pub seed: u32,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            noise_scale: 20.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            height_amplitude: 10.0,
            seed: 0,
        }
    }
}

impl NoiseParameters {
    pub fn validate(&self) -> Result<(), NoiseError> {
        if !(self.noise_scale.is_finite() && self.noise_scale > 0.0) {
            return Err(NoiseError::InvalidScale(self.noise_scale));
        }
        if self.octaves == 0 {
            return Err(NoiseError::InvalidOctaves);
        }
        for (name, value) in [
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(NoiseError::InvalidFalloff { name, value });
            }
        }
        Ok(())
    }
}

/// Fractal Brownian motion over a Perlin gradient primitive.
///
/// Layer `o` samples the primitive at `world / noise_scale * lacunarity^o`
/// weighted by `persistence^o`. The weighted sum is divided by the total
/// weight so a single octave returns the primitive unchanged.
#[derive(Debug, Clone)]
pub struct NoiseField {
    params: NoiseParameters,
    perlin: Perlin,
    total_amplitude: f64,
}

impl NoiseField {
    pub fn new(params: NoiseParameters) -> Result<Self, NoiseError> {
        params.validate()?;
        let mut total_amplitude = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..params.octaves {
            total_amplitude += amplitude;
            amplitude *= params.persistence;
        }
        Ok(Self {
            params,
            perlin: Perlin::new(params.seed),
            total_amplitude,
        })
    }

    pub fn params(&self) -> &NoiseParameters {
        &self.params
    }

    /// Base gradient primitive remapped from `[-1, 1]` to `[0, 1]`.
    pub fn gradient(&self, x: f64, z: f64) -> f64 {
        ((self.perlin.get([x, z]) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Normalized terrain height at a world position, in `[0, 1]`.
    pub fn height(&self, world_x: f64, world_z: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for _ in 0..self.params.octaves {
            let nx = world_x / self.params.noise_scale * frequency;
            let nz = world_z / self.params.noise_scale * frequency;
            value += amplitude * self.gradient(nx, nz);
            amplitude *= self.params.persistence;
            frequency *= self.params.lacunarity;
        }

        (value / self.total_amplitude).clamp(0.0, 1.0)
    }

    /// Height in world units: `height * height_amplitude`.
    pub fn world_height(&self, world_x: f64, world_z: f64) -> f64 {
        self.height(world_x, world_z) * self.params.height_amplitude
    }
}
