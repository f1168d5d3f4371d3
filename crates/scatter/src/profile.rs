use serde::{Deserialize, Serialize};

/// Upper bound on `decoration_density`, in placements per unit of resolution.
pub const MAX_DECORATION_DENSITY: f32 = 100.0;

/// Errors from validating a detail profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error(
        "profile {profile:?}: decoration_density must be finite and within [0, {max}], got {value}",
        max = MAX_DECORATION_DENSITY
    )]
    InvalidDensity { profile: String, value: f32 },
}

/// Decoration density and material settings for one terrain biome.
///
/// `height_variation` and `material_id` are carried for the render layer;
/// the scatterer only reads the density and candidate lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainDetailProfile {
    pub name: String,
    /// Placements per unit of chunk resolution.
    pub decoration_density: f32,
    pub height_variation: f32,
    pub material_id: String,
    pub vegetation_candidates: Vec<String>,
    pub rock_candidates: Vec<String>,
}

impl TerrainDetailProfile {
    /// Lowland grass profile.
    pub fn meadow() -> Self {
        Self {
            name: "meadow".into(),
            decoration_density: 0.5,
            height_variation: 0.3,
            material_id: "terrain/grass".into(),
            vegetation_candidates: vec!["grass_tuft".into(), "shrub".into(), "birch".into()],
            rock_candidates: vec!["pebble".into()],
        }
    }

    /// Rocky profile used near mountains.
    pub fn highland() -> Self {
        Self {
            name: "highland".into(),
            decoration_density: 0.3,
            height_variation: 0.8,
            material_id: "terrain/rock".into(),
            vegetation_candidates: vec!["pine".into(), "heather".into()],
            rock_candidates: vec!["boulder".into(), "slate".into(), "pebble".into()],
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let d = self.decoration_density;
        if !(d.is_finite() && (0.0..=MAX_DECORATION_DENSITY).contains(&d)) {
            return Err(ProfileError::InvalidDensity {
                profile: self.name.clone(),
                value: d,
            });
        }
        Ok(())
    }

    /// Target vegetation count for a chunk of the given resolution.
    ///
    /// Zero for a profile that fails [`Self::validate`].
    pub fn vegetation_target(&self, resolution: u32) -> usize {
        self.target(resolution, 1.0)
    }

    /// Target rock count for a chunk of the given resolution.
    ///
    /// Zero for a profile that fails [`Self::validate`].
    pub fn rock_target(&self, resolution: u32) -> usize {
        self.target(resolution, 0.3)
    }

    fn target(&self, resolution: u32, ratio: f32) -> usize {
        if self.validate().is_err() {
            return 0;
        }
        (resolution as f64 * self.decoration_density as f64 * ratio as f64).floor() as usize
    }
}
