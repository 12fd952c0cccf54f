use bevy::prelude::*;
use point_cloud::PointCloudPlugin;

mod point_mesh;

pub use point_mesh::{point_material, point_set_mesh};

pub struct GraphicsPlugin;

impl Plugin for GraphicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PointCloudPlugin);
    }
}
