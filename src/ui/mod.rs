use bevy::prelude::*;

mod camera;
mod config_egui;
mod stats_widget;
mod viewport;

pub use viewport::RenderScale;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            camera::CameraPlugin,
            config_egui::ConfigEguiPlugin,
            stats_widget::StatsWidgetPlugin,
            viewport::ViewportPlugin,
        ));
    }
}
