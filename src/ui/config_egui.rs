use crate::prelude::*;
use bevy::{color::ColorToPacked, prelude::*};
use bevy_egui::{egui, EguiContexts};

pub struct ConfigEguiPlugin;

impl Plugin for ConfigEguiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GalaxyParametersUi>()
            .add_systems(Startup, configure_visuals_system)
            .add_systems(Update, ui_system);
    }
}

/// Values as shown in the panel. Only copied into [`GalaxyParameters`] once an
/// edit is finished, so dragging a slider does not rebuild on every frame.
#[derive(Resource, Clone, Debug)]
pub struct GalaxyParametersUi(pub GalaxyParameters);

impl FromWorld for GalaxyParametersUi {
    fn from_world(world: &mut World) -> Self {
        Self(
            world
                .get_resource::<GalaxyParameters>()
                .cloned()
                .unwrap_or_default(),
        )
    }
}

impl GalaxyParametersUi {
    /// Publishes the draft. Returns whether the galaxy parameters changed.
    pub fn commit(&self, params: &mut impl DetectChangesMut<Inner = GalaxyParameters>) -> bool {
        params.set_if_neq(self.0.clone())
    }
}

fn configure_visuals_system(mut contexts: EguiContexts) {
    contexts.ctx_mut().set_visuals(egui::Visuals {
        window_corner_radius: 0.0.into(),
        ..egui::Visuals::dark()
    });
}

/// A slider counts as finished when the drag is released; clicks and typed
/// values finish immediately.
fn edit_finished(response: &egui::Response) -> bool {
    response.drag_stopped() || (response.changed() && !response.dragged())
}

fn color_ui(label: &str, color: &mut Srgba, ui: &mut egui::Ui) -> bool {
    ui.horizontal(|ui| {
        let mut rgb = color.to_u8_array_no_alpha();
        let changed = ui.color_edit_button_srgb(&mut rgb).changed();
        ui.label(label);
        if changed {
            *color = Srgba::from_u8_array_no_alpha(rgb);
        }
        changed
    })
    .inner
}

fn ui_system(
    mut contexts: EguiContexts,
    mut draft: ResMut<GalaxyParametersUi>,
    mut params: ResMut<GalaxyParameters>,
    point_count: Res<PointCount>,
    mut regenerate: EventWriter<RegenerateGalaxy>,
) {
    let ctx = contexts.ctx_mut();
    let mut finished = false;

    let minval = GalaxyParameters::MIN;
    let maxval = GalaxyParameters::MAX;

    egui::SidePanel::left("side_panel")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Galaxy");
            let config = &mut draft.0;

            let mut slider = |ui: &mut egui::Ui, slider: egui::Slider| {
                finished |= edit_finished(&ui.add(slider));
            };
            slider(
                ui,
                egui::Slider::new(&mut config.count, minval.count..=maxval.count)
                    .step_by(100.0)
                    .text("Count"),
            );
            slider(
                ui,
                egui::Slider::new(&mut config.size, minval.size..=maxval.size)
                    .step_by(0.001)
                    .text("Size"),
            );
            slider(
                ui,
                egui::Slider::new(&mut config.radius, minval.radius..=maxval.radius)
                    .step_by(0.01)
                    .text("Radius"),
            );
            slider(
                ui,
                egui::Slider::new(&mut config.branches, minval.branches..=maxval.branches)
                    .step_by(1.0)
                    .text("Branches"),
            );
            slider(
                ui,
                egui::Slider::new(&mut config.spin, minval.spin..=maxval.spin)
                    .step_by(0.01)
                    .text("Spin"),
            );
            slider(
                ui,
                egui::Slider::new(
                    &mut config.randomness,
                    minval.randomness..=maxval.randomness,
                )
                .step_by(0.001)
                .text("Randomness"),
            );
            slider(
                ui,
                egui::Slider::new(
                    &mut config.randomness_power,
                    minval.randomness_power..=maxval.randomness_power,
                )
                .step_by(0.001)
                .text("Randomness Power"),
            );

            ui.separator();
            finished |= color_ui("Inside Color", &mut config.inside_color, ui);
            finished |= color_ui("Outside Color", &mut config.outside_color, ui);

            ui.separator();
            if ui.button("Regenerate").clicked() {
                regenerate.write(RegenerateGalaxy);
            }
            ui.label(format!(
                "{} points, build #{}",
                point_count.count, point_count.generation
            ));
        });

    if finished && draft.commit(&mut params) {
        debug!("Galaxy parameters committed: {:?}", *params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_starts_from_current_parameters() {
        let mut world = World::new();
        world.insert_resource(GalaxyParameters {
            count: 4200,
            ..default()
        });
        let draft = GalaxyParametersUi::from_world(&mut world);
        assert_eq!(draft.0.count, 4200);
    }

    #[test]
    fn draft_defaults_without_parameters() {
        let mut world = World::new();
        let draft = GalaxyParametersUi::from_world(&mut world);
        assert_eq!(draft.0, GalaxyParameters::default());
    }

    #[test]
    fn commit_only_marks_real_changes() {
        let mut world = World::new();
        world.insert_resource(GalaxyParameters::default());
        let mut draft = GalaxyParametersUi::from_world(&mut world);

        world.clear_trackers();
        let mut params = world.resource_mut::<GalaxyParameters>();
        assert!(!draft.commit(&mut params));
        assert!(!params.is_changed());

        draft.0.branches = 7;
        let mut params = world.resource_mut::<GalaxyParameters>();
        assert!(draft.commit(&mut params));
        assert!(params.is_changed());
        assert_eq!(params.branches, 7);
    }
}
