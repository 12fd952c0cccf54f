use bevy::prelude::*;

/// Environment variable holding a `u64` seed for the galaxy rng
pub const SEED_VAR: &str = "GALAXY_SEED";

pub struct ViewerConfigPlugin;

impl Plugin for ViewerConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ViewerConfig::from_env());
    }
}

/// Fixed viewer settings. Galaxy shape lives in `GalaxyParameters` instead,
/// since that one is edited at runtime.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub seed: Option<u64>,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_start: Vec3,
    /// Share of pending orbit motion applied per 60 Hz frame
    pub damping_factor: f32,
    pub max_pixel_ratio: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            camera_start: Vec3::splat(3.0),
            damping_factor: 0.05,
            max_pixel_ratio: 2.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self {
            seed: parse_seed(std::env::var(SEED_VAR).ok().as_deref()),
            ..default()
        }
    }
}

fn parse_seed(value: Option<&str>) -> Option<u64> {
    let value = value?.trim();
    match value.parse() {
        Ok(seed) => Some(seed),
        Err(err) => {
            warn!("Ignoring {SEED_VAR}={value:?}: {err}");
            None
        }
    }
}
