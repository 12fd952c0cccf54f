use bevy::diagnostic::DiagnosticsStore;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;

use crate::prelude::*;

pub struct StatsWidgetPlugin;

impl Plugin for StatsWidgetPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_widget)
            .add_systems(Update, update_widget_system)
            .add_plugins(FrameTimeDiagnosticsPlugin::default());
    }
}

#[derive(Component)]
struct StatsWidget;

fn setup_widget(mut commands: Commands) {
    commands
        .spawn((
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::FlexStart,
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::FlexStart,
                width: Val::Px(240.),
                right: Val::Percent(1.),
                top: Val::Percent(1.),
                padding: UiRect::all(Val::Px(4.0)),
                ..default()
            },
            BackgroundColor(Color::linear_rgba(0.0, 0.03, 0.08, 0.5)),
            GlobalZIndex(i32::MAX - 1),
        ))
        .with_children(|parent| {
            parent.spawn((
                StatsWidget,
                Text(" N/A".to_string()),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
            ));
        });
}

fn stats_label(fps: f64, frame_time: f64, points: usize) -> String {
    format!("FPS: {fps:.1} ({frame_time:.2} ms)\nPoints: {points}")
}

fn update_widget_system(
    diagnostics: Res<DiagnosticsStore>,
    point_count: Res<PointCount>,
    mut query: Query<&mut Text, With<StatsWidget>>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0);
    let frame_time = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(|frame_time| frame_time.smoothed())
        .unwrap_or(0.0);

    for mut text in &mut query {
        text.0 = stats_label(fps, frame_time, point_count.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_shows_rate_and_points() {
        assert_eq!(
            stats_label(59.94, 16.683, 100_000),
            "FPS: 59.9 (16.68 ms)\nPoints: 100000"
        );
    }
}
