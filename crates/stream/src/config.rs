use std::path::Path;

use serde::{Deserialize, Serialize};
use terrastream_common::ChunkGrid;
use terrastream_mesh::MeshError;
use terrastream_noise::{NoiseError, NoiseParameters};

/// Errors from loading or validating a terrain configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("local_radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("resolution must be at least 1")]
    ZeroResolution,
    #[error("update_threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f32),
    #[error("max_height must be finite, got {0}")]
    InvalidHeight(f32),
    #[error("evict_margin must be finite and non-negative, got {0}")]
    InvalidMargin(f32),
    #[error("noise parameters: {0}")]
    Noise(#[from] NoiseError),
    #[error("chunk grid: {0}")]
    Mesh(#[from] MeshError),
}

/// Process-wide terrain settings, set once at start-up.
///
/// Missing YAML keys fall back to [`TerrainConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Half the width of a chunk; admission radius is `1.5 * local_radius`.
    pub local_radius: f32,
    /// Grid cells per chunk side.
    pub resolution: u32,
    /// World height of a noise sample at 1.0.
    pub max_height: f32,
    pub noise_scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Observer displacement that triggers a recompute.
    pub update_threshold: f32,
    pub seed: u32,
    /// Extra distance beyond the admission radius before a chunk is evicted.
    pub evict_margin: f32,
    /// Build admitted chunks on the rayon pool.
    pub parallel_build: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            local_radius: 50.0,
            resolution: 50,
            max_height: 10.0,
            noise_scale: 20.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            update_threshold: 10.0,
            seed: 0,
            evict_margin: 0.0,
            parallel_build: false,
        }
    }
}

impl TerrainConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.as_ref().display(), "terrain config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.local_radius.is_finite() && self.local_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.local_radius));
        }
        if self.resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        let cell_size = self.local_radius * 2.0 / self.resolution as f32;
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::Mesh(MeshError::InvalidCellSize(cell_size)));
        }
        if !(self.update_threshold.is_finite() && self.update_threshold >= 0.0) {
            return Err(ConfigError::InvalidThreshold(self.update_threshold));
        }
        if !self.max_height.is_finite() {
            return Err(ConfigError::InvalidHeight(self.max_height));
        }
        if !(self.evict_margin.is_finite() && self.evict_margin >= 0.0) {
            return Err(ConfigError::InvalidMargin(self.evict_margin));
        }
        self.noise_parameters().validate()?;
        Ok(())
    }

    pub fn noise_parameters(&self) -> NoiseParameters {
        NoiseParameters {
            noise_scale: self.noise_scale,
            octaves: self.octaves,
            persistence: self.persistence,
            lacunarity: self.lacunarity,
            height_amplitude: self.max_height as f64,
            seed: self.seed,
        }
    }

    /// Grid frame: cell size is `local_radius * 2 / resolution`.
    ///
    /// Panics on a configuration that fails [`Self::validate`].
    pub fn grid(&self) -> ChunkGrid {
        ChunkGrid::from_radius(self.local_radius, self.resolution)
    }

    /// Chunks whose center is closer than this are admitted.
    pub fn admit_radius(&self) -> f32 {
        self.local_radius * 1.5
    }

    /// Resident chunks at or beyond this distance are evicted.
    pub fn evict_radius(&self) -> f32 {
        self.admit_radius() + self.evict_margin
    }

    /// Half-width, in chunks, of the candidate lattice scanned for admission.
    ///
    /// Chunks are `2 * local_radius` wide, so any chunk whose center is within
    /// the admission radius lies at most `ceil(admit_radius / chunk_size)`
    /// chunks from the observer's chunk. That bound is 1 for every valid
    /// configuration.
    pub fn lattice_radius(&self) -> i32 {
        let chunk_size = self.local_radius * 2.0;
        ((self.admit_radius() / chunk_size).ceil() as i32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = TerrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.admit_radius(), 75.0);
        assert_eq!(config.evict_radius(), 75.0);
        assert_eq!(config.grid().cell_size(), 2.0);
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = TerrainConfig::from_yaml_str("local_radius: 20\nresolution: 4\n").unwrap();
        assert_eq!(config.local_radius, 20.0);
        assert_eq!(config.resolution, 4);
        assert_eq!(config.octaves, TerrainConfig::default().octaves);
    }

    #[test]
    fn rejects_invalid_values() {
        let zero_res = TerrainConfig {
            resolution: 0,
            ..TerrainConfig::default()
        };
        assert!(matches!(zero_res.validate(), Err(ConfigError::ZeroResolution)));

        let neg_radius = TerrainConfig {
            local_radius: -1.0,
            ..TerrainConfig::default()
        };
        assert!(matches!(neg_radius.validate(), Err(ConfigError::InvalidRadius(_))));

        let bad_noise = TerrainConfig {
            octaves: 0,
            ..TerrainConfig::default()
        };
        assert!(matches!(bad_noise.validate(), Err(ConfigError::Noise(_))));

        let overflowing = TerrainConfig {
            local_radius: f32::MAX,
            ..TerrainConfig::default()
        };
        assert!(matches!(
            overflowing.validate(),
            Err(ConfigError::Mesh(MeshError::InvalidCellSize(_)))
        ));

        let vanishing = TerrainConfig {
            local_radius: f32::MIN_POSITIVE,
            resolution: u32::MAX,
            ..TerrainConfig::default()
        };
        assert!(matches!(
            vanishing.validate(),
            Err(ConfigError::Mesh(MeshError::InvalidCellSize(_)))
        ));

        assert!(matches!(
            TerrainConfig::from_yaml_str("resolution: 0"),
            Err(ConfigError::ZeroResolution)
        ));
        assert!(matches!(
            TerrainConfig::from_yaml_str("resolution: [1, 2]"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn lattice_radius_is_at_least_one() {
        let config = TerrainConfig {
            local_radius: 50.0,
            resolution: 100,
            ..TerrainConfig::default()
        };
        assert_eq!(config.lattice_radius(), 1);
        // Scan width does not grow with cells per chunk.
        let coarse = TerrainConfig {
            local_radius: 20_000.0,
            resolution: 1,
            ..TerrainConfig::default()
        };
        assert_eq!(coarse.lattice_radius(), 1);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "local_radius: 30\nresolution: 10\nevict_margin: 5\nparallel_build: true").unwrap();
        let config = TerrainConfig::load(file.path()).unwrap();
        assert_eq!(config.local_radius, 30.0);
        assert_eq!(config.evict_radius(), 50.0);
        assert!(config.parallel_build);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TerrainConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
