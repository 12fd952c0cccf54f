use bevy::{
    asset::{load_internal_asset, weak_handle},
    prelude::*,
};
mod point_material;

pub use point_material::{PointCloudMaterial, PointCloudMaterialKey, PointStyle};

pub(crate) const POINT_CLOUD_SHADER_HANDLE: Handle<Shader> =
    weak_handle!("5d0c8f4e-2b7a-4c1e-9f63-8a41d2e7b3c5");

/// Renders meshes carrying a [`PointCloudMaterial`] as screen-space point sprites.
///
/// Meshes are expected to hold one quad per point: every corner repeats the
/// point centre in `ATTRIBUTE_POSITION`, carries its corner offset in
/// `ATTRIBUTE_UV_0` and the point colour in `ATTRIBUTE_COLOR`.
pub struct PointCloudPlugin;

impl Plugin for PointCloudPlugin {
    fn build(&self, app: &mut App) {
        load_internal_asset!(
            app,
            POINT_CLOUD_SHADER_HANDLE,
            "point_cloud.wgsl",
            Shader::from_wgsl
        );

        app.add_plugins(MaterialPlugin::<PointCloudMaterial>::default());
    }
}
