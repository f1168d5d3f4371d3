use std::sync::Arc;

use glam::Vec3;
use terrastream_scatter::{ProfileError, TerrainDetailProfile};

/// Picks the detail profile for a chunk from its center position.
///
/// Supplied by the host at streamer construction. Implemented for any
/// `Fn(Vec3) -> Arc<TerrainDetailProfile>` closure.
pub trait ProfileSelector: Send + Sync {
    fn select(&self, chunk_center: Vec3) -> Arc<TerrainDetailProfile>;
}

impl<F> ProfileSelector for F
where
    F: Fn(Vec3) -> Arc<TerrainDetailProfile> + Send + Sync,
{
    fn select(&self, chunk_center: Vec3) -> Arc<TerrainDetailProfile> {
        self(chunk_center)
    }
}

/// Two-profile proximity rule around a named landmark.
///
/// Chunks whose center lies within `radius` of the landmark (XZ plane) get
/// `near`, all others get `far`.
#[derive(Debug, Clone)]
pub struct LandmarkSelector {
    pub name: String,
    pub landmark: Vec3,
    pub radius: f32,
    pub near: Arc<TerrainDetailProfile>,
    pub far: Arc<TerrainDetailProfile>,
}

impl LandmarkSelector {
    /// Both profiles must pass [`TerrainDetailProfile::validate`].
    pub fn new(
        name: impl Into<String>,
        landmark: Vec3,
        radius: f32,
        near: TerrainDetailProfile,
        far: TerrainDetailProfile,
    ) -> Result<Self, ProfileError> {
        near.validate()?;
        far.validate()?;
        Ok(Self {
            name: name.into(),
            landmark,
            radius,
            near: Arc::new(near),
            far: Arc::new(far),
        })
    }

    /// Highland near the landmark, meadow elsewhere.
    pub fn mountain(landmark: Vec3, radius: f32) -> Self {
        Self {
            name: "mountain".into(),
            landmark,
            radius,
            near: Arc::new(TerrainDetailProfile::highland()),
            far: Arc::new(TerrainDetailProfile::meadow()),
        }
    }

    fn horizontal_distance(&self, p: Vec3) -> f32 {
        let d = p - self.landmark;
        (d.x * d.x + d.z * d.z).sqrt()
    }
}

impl ProfileSelector for LandmarkSelector {
    fn select(&self, chunk_center: Vec3) -> Arc<TerrainDetailProfile> {
        if self.horizontal_distance(chunk_center) <= self.radius {
            Arc::clone(&self.near)
        } else {
            Arc::clone(&self.far)
        }
    }
}
