use bevy::{
    pbr::{MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    reflect::TypePath,
    render::{
        mesh::MeshVertexBufferLayoutRef,
        render_resource::{
            AsBindGroup, RenderPipelineDescriptor, ShaderRef, ShaderType,
            SpecializedMeshPipelineError,
        },
    },
};
use bytemuck::{Pod, Zeroable};

use super::POINT_CLOUD_SHADER_HANDLE;

// Duplicated in point_cloud.wgsl, so make sure to update both
#[derive(ShaderType, Pod, Zeroable, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct PointStyle {
    /// Pixels without attenuation, world units with it
    pub size: f32,
    /// Render target pixels per logical pixel, only used without attenuation
    pub pixel_ratio: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            size: 1.0,
            pixel_ratio: 1.0,
        }
    }
}

/// Square, additively blended point sprites with per-vertex colour.
/// Depth is tested but never written, so overlapping points accumulate.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
#[bind_group_data(PointCloudMaterialKey)]
pub struct PointCloudMaterial {
    #[uniform(0)]
    pub style: PointStyle,
    pub size_attenuation: bool,
    pub alpha_mode: AlphaMode,
}

impl PointCloudMaterial {
    pub fn new(size: f32) -> Self {
        Self {
            style: PointStyle {
                size,
                ..default()
            },
            size_attenuation: true,
            alpha_mode: AlphaMode::Add,
        }
    }
}

impl Default for PointCloudMaterial {
    fn default() -> Self {
        Self::new(PointStyle::default().size)
    }
}

impl Material for PointCloudMaterial {
    fn vertex_shader() -> ShaderRef {
        POINT_CLOUD_SHADER_HANDLE.into()
    }

    fn fragment_shader() -> ShaderRef {
        POINT_CLOUD_SHADER_HANDLE.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];

        if key.bind_group_data.size_attenuation {
            descriptor.vertex.shader_defs.push("SIZE_ATTENUATION".into());
        }
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = false;
        }
        // sprites are built in clip space, winding is irrelevant
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

// Pipelines are specialized on whether the sprite size shrinks with distance.
#[derive(Eq, PartialEq, Hash, Clone)]
pub struct PointCloudMaterialKey {
    size_attenuation: bool,
}

impl From<&PointCloudMaterial> for PointCloudMaterialKey {
    fn from(material: &PointCloudMaterial) -> Self {
        Self {
            size_attenuation: material.size_attenuation,
        }
    }
}
