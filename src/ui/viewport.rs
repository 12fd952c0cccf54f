use crate::prelude::*;
use bevy::{
    prelude::*,
    render::{
        render_asset::RenderAssetUsages,
        render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages},
        view::RenderLayers,
    },
    window::PrimaryWindow,
};
use point_cloud::PointCloudMaterial;

/// Layer of the camera that presents the scene image on the window
const PRESENT_LAYER: usize = 1;

pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RenderScale>().add_systems(
            Update,
            (
                attach_scaled_target,
                resize_scaled_target,
                sync_point_pixel_ratio.run_if(resource_changed::<RenderScale>),
            )
                .chain(),
        );
    }
}

/// Resolution the scene is rendered at. Dense displays render at no more
/// than `ViewerConfig::max_pixel_ratio` pixels per logical pixel, the result
/// is stretched over the window.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct RenderScale {
    /// Render pixels per logical window pixel
    pub pixel_ratio: f32,
    pub size: UVec2,
}

impl Default for RenderScale {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            size: UVec2::ONE,
        }
    }
}

impl RenderScale {
    pub fn for_window(logical_size: Vec2, scale_factor: f32, max_pixel_ratio: f32) -> Self {
        let pixel_ratio = scale_factor.min(max_pixel_ratio);
        Self {
            pixel_ratio,
            size: (logical_size * pixel_ratio).round().as_uvec2().max(UVec2::ONE),
        }
    }

    fn of(window: &Window, config: &ViewerConfig) -> Self {
        Self::for_window(window.size(), window.scale_factor(), config.max_pixel_ratio)
    }

    fn extent(&self) -> Extent3d {
        Extent3d {
            width: self.size.x,
            height: self.size.y,
            ..default()
        }
    }
}

/// Cameras carrying this render into an image sized by [`RenderScale`]
/// instead of straight to the window.
#[derive(Component, Default)]
pub struct ScaledRender;

/// The image a [`ScaledRender`] camera draws into
#[derive(Component)]
pub struct ScaledRenderTarget {
    pub image: Handle<Image>,
}

/// Full-window sprite showing the scene image
#[derive(Component)]
struct PresentedScene;

fn scene_image(scale: &RenderScale) -> Image {
    let mut image = Image::new_fill(
        scale.extent(),
        TextureDimension::D2,
        &[0, 0, 0, 0],
        TextureFormat::Bgra8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.texture_descriptor.usage =
        TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST | TextureUsages::RENDER_ATTACHMENT;
    image
}

fn attach_scaled_target(
    mut commands: Commands,
    mut cameras: Query<(Entity, &mut Camera), Added<ScaledRender>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut images: ResMut<Assets<Image>>,
    mut render_scale: ResMut<RenderScale>,
    config: Res<ViewerConfig>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    for (entity, mut camera) in &mut cameras {
        let scale = RenderScale::of(window, &config);
        let image = images.add(scene_image(&scale));
        camera.target = image.clone().into();
        render_scale.set_if_neq(scale);

        // egui and the stats overlay still draw at the window's own resolution
        commands.spawn((
            Camera2d,
            Camera {
                order: camera.order + 1,
                ..default()
            },
            RenderLayers::layer(PRESENT_LAYER),
        ));
        commands.spawn((
            Sprite {
                image: image.clone(),
                custom_size: Some(window.size()),
                ..default()
            },
            RenderLayers::layer(PRESENT_LAYER),
            PresentedScene,
        ));
        commands.entity(entity).insert(ScaledRenderTarget { image });

        info!(
            "Display scale {}, rendering at {}x{}",
            window.scale_factor(),
            scale.size.x,
            scale.size.y
        );
    }
}

/// Follows window resizes and moves between displays
fn resize_scaled_target(
    windows: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
    targets: Query<&ScaledRenderTarget>,
    mut sprites: Query<&mut Sprite, With<PresentedScene>>,
    mut images: ResMut<Assets<Image>>,
    mut render_scale: ResMut<RenderScale>,
    config: Res<ViewerConfig>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    let logical_size = Some(window.size());
    for mut sprite in &mut sprites {
        if sprite.custom_size != logical_size {
            sprite.custom_size = logical_size;
        }
    }

    let scale = RenderScale::of(window, &config);
    if !render_scale.set_if_neq(scale) {
        return;
    }
    for target in &targets {
        if let Some(image) = images.get_mut(&target.image) {
            image.resize(scale.extent());
        }
    }
    debug!("Scene image resized to {}x{}", scale.size.x, scale.size.y);
}

/// Unattenuated sprite sizes are in logical pixels, so they follow the render scale
fn sync_point_pixel_ratio(
    render_scale: Res<RenderScale>,
    mut materials: ResMut<Assets<PointCloudMaterial>>,
) {
    for (_, material) in materials.iter_mut() {
        material.style.pixel_ratio = render_scale.pixel_ratio;
    }
}
