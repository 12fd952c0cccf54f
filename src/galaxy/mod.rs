use bevy::prelude::*;

mod error;
mod galaxy_config;
mod generator;
mod spawn_points;

pub use error::GalaxyError;
pub use galaxy_config::GalaxyParameters;
pub use generator::{generate_galaxy, ColorRamp, PointSet};
pub use spawn_points::{PointCount, RegenerateGalaxy, SpawnPointsPlugin};

pub struct GalaxyPlugin;

impl Plugin for GalaxyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GalaxyParameters>()
            .add_plugins(SpawnPointsPlugin);
    }
}
