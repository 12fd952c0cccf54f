use crate::prelude::*;
use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit},
    prelude::*,
    transform::TransformSystem,
    window::PrimaryWindow,
};
use bevy_egui::EguiContexts;

use super::viewport::ScaledRender;
use std::f32::consts::{PI, TAU};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            PostUpdate,
            camera_control_system.before(TransformSystem::TransformPropagate),
        );
    }
}

/// Keeps the polar angle off the poles, where the orbit basis degenerates
const POLE_EPSILON: f32 = 1e-6;
/// Dolly factor per wheel line
const ZOOM_STEP: f32 = 0.95;
/// Pixel-unit scroll deltas are converted to lines with this
const PIXELS_PER_LINE: f32 = 100.0;

fn spawn_camera(
    mut commands: Commands,
    mut clear_color: ResMut<ClearColor>,
    config: Res<ViewerConfig>,
) {
    *clear_color = ClearColor(Color::BLACK);

    let orbit = OrbitCamera::looking_from(config.camera_start, Vec3::ZERO)
        .with_damping(config.damping_factor)
        .with_distance_limits(config.near, config.far);

    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            ..default()
        }),
        Transform::from_translation(orbit.eye()).looking_at(orbit.target, Vec3::Y),
        orbit,
        ScaledRender,
    ));
}

/// Damped orbit around a target point.
///
/// Input only queues motion, [`OrbitCamera::update`] then applies a share of
/// the queue every frame so the camera glides to a halt.
#[derive(Component, Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    distance: f32,
    /// Azimuth around +Y, measured from +Z towards +X
    theta: f32,
    /// Polar angle from +Y
    phi: f32,
    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec3,
    pending_zoom: f32,
    damping_factor: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitCamera {
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length();
        let phi = if distance > 0.0 {
            (offset.y / distance).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };
        Self {
            target,
            distance,
            theta: offset.x.atan2(offset.z),
            phi: phi.clamp(POLE_EPSILON, PI - POLE_EPSILON),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec3::ZERO,
            pending_zoom: 1.0,
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_factor = damping_factor.clamp(0.0, 1.0);
        self
    }

    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self.distance = self.distance.clamp(min, max);
        self
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn eye(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + self.distance
                * Vec3::new(
                    sin_phi * self.theta.sin(),
                    self.phi.cos(),
                    sin_phi * self.theta.cos(),
                )
    }

    /// A drag across the full viewport height turns the camera once around
    pub fn rotate(&mut self, drag: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.pending_theta -= TAU * drag.x / viewport_height;
        self.pending_phi -= TAU * drag.y / viewport_height;
    }

    /// Moves the target so the point under the cursor follows the drag
    pub fn pan(&mut self, drag: Vec2, viewport_height: f32, fov: f32, rotation: Quat) {
        if viewport_height <= 0.0 {
            return;
        }
        // world units per pixel at the target's depth
        let scale = 2.0 * self.distance * (fov * 0.5).tan() / viewport_height;
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        self.pending_pan += (up * drag.y - right * drag.x) * scale;
    }

    /// Positive steps move towards the target
    pub fn zoom(&mut self, steps: f32) {
        self.pending_zoom *= ZOOM_STEP.powf(steps);
    }

    /// Applies queued motion, scaled so damping feels the same at any frame rate
    pub fn update(&mut self, delta_secs: f32) {
        let share = 1.0 - (1.0 - self.damping_factor).powf(delta_secs * 60.0);

        self.theta += self.pending_theta * share;
        self.phi = (self.phi + self.pending_phi * share).clamp(POLE_EPSILON, PI - POLE_EPSILON);
        self.target += self.pending_pan * share;
        self.distance = (self.distance * self.pending_zoom).clamp(self.min_distance, self.max_distance);

        self.pending_theta *= 1.0 - share;
        self.pending_phi *= 1.0 - share;
        self.pending_pan *= 1.0 - share;
        self.pending_zoom = 1.0;
    }
}

fn camera_control_system(
    mut query: Query<(&mut Transform, &mut OrbitCamera, &Projection)>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    let Ok((mut transform, mut orbit, projection)) = query.single_mut() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };

    // the panel keeps the pointer while it is hovered or being dragged
    let ctx = contexts.ctx_mut();
    let panel_has_pointer = ctx.wants_pointer_input() || ctx.is_pointer_over_area();

    if !panel_has_pointer {
        let height = window.height();
        let drag = mouse_motion.delta;

        if mouse_buttons.pressed(MouseButton::Left) {
            orbit.rotate(drag, height);
        } else if mouse_buttons.any_pressed([MouseButton::Right, MouseButton::Middle]) {
            let fov = match projection {
                Projection::Perspective(perspective) => perspective.fov,
                _ => PI / 4.0,
            };
            orbit.pan(drag, height, fov, transform.rotation);
        }

        let steps = match mouse_scroll.unit {
            MouseScrollUnit::Line => mouse_scroll.delta.y,
            MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_LINE,
        };
        if steps != 0.0 {
            orbit.zoom(steps);
        }
    }

    orbit.update(time.delta_secs());
    transform.translation = orbit.eye();
    transform.look_at(orbit.target, Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn settle(orbit: &mut OrbitCamera) {
        for _ in 0..2000 {
            orbit.update(FRAME);
        }
    }

    #[test]
    fn starts_where_it_was_placed() {
        let orbit = OrbitCamera::looking_from(Vec3::splat(3.0), Vec3::ZERO);
        assert!(orbit.eye().abs_diff_eq(Vec3::splat(3.0), 1e-4));
        assert!((orbit.distance() - 27f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn idle_camera_stays_put() {
        let mut orbit = OrbitCamera::looking_from(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        let before = orbit.eye();
        settle(&mut orbit);
        assert!(orbit.eye().abs_diff_eq(before, 1e-5));
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut orbit = OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        // a quarter of the viewport height is a quarter turn
        orbit.rotate(Vec2::new(-100.0, 0.0), 400.0);

        orbit.update(FRAME);
        let first_step = orbit.theta;
        assert!((first_step - 0.05 * PI / 2.0).abs() < 1e-4);

        settle(&mut orbit);
        assert!((orbit.theta - PI / 2.0).abs() < 1e-3);
        assert!(orbit.eye().abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-2));
    }

    #[test]
    fn damping_is_frame_rate_independent() {
        let mut fast = OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let mut slow = fast.clone();
        fast.rotate(Vec2::new(50.0, 0.0), 400.0);
        slow.rotate(Vec2::new(50.0, 0.0), 400.0);

        fast.update(FRAME / 2.0);
        fast.update(FRAME / 2.0);
        slow.update(FRAME);
        assert!((fast.theta - slow.theta).abs() < 1e-5);
    }

    #[test]
    fn polar_angle_never_reaches_the_pole() {
        let mut orbit = OrbitCamera::looking_from(Vec3::splat(3.0), Vec3::ZERO);
        orbit.rotate(Vec2::new(0.0, 10_000.0), 100.0);
        settle(&mut orbit);
        assert!(orbit.phi >= POLE_EPSILON);
        assert!(orbit.eye().is_finite());
    }

    #[test]
    fn zoom_is_clamped_to_limits() {
        let mut orbit = OrbitCamera::looking_from(Vec3::splat(3.0), Vec3::ZERO)
            .with_distance_limits(0.1, 100.0);
        orbit.zoom(1.0);
        orbit.update(FRAME);
        assert!((orbit.distance() - 27f32.sqrt() * 0.95).abs() < 1e-4);

        orbit.zoom(-1000.0);
        orbit.update(FRAME);
        assert_eq!(orbit.distance(), 100.0);

        orbit.zoom(1000.0);
        orbit.update(FRAME);
        assert_eq!(orbit.distance(), 0.1);
    }

    #[test]
    fn pan_moves_target_against_drag() {
        let mut orbit = OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        // camera looking down -Z, so its right is +X
        orbit.pan(Vec2::new(10.0, 0.0), 500.0, PI / 2.0, Quat::IDENTITY);
        settle(&mut orbit);
        // 2 * 5 * tan(45deg) / 500 = 0.02 world units per pixel
        assert!(orbit.target.abs_diff_eq(Vec3::new(-0.2, 0.0, 0.0), 1e-3));
        assert!((orbit.distance() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn zero_height_viewport_ignores_drags() {
        let mut orbit = OrbitCamera::looking_from(Vec3::splat(3.0), Vec3::ZERO);
        let before = orbit.eye();
        orbit.rotate(Vec2::new(10.0, 10.0), 0.0);
        orbit.pan(Vec2::new(10.0, 10.0), 0.0, 1.0, Quat::IDENTITY);
        settle(&mut orbit);
        assert!(orbit.eye().abs_diff_eq(before, 1e-5));
    }
}
