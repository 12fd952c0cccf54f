use bevy::{
    prelude::*,
    render::{
        mesh::{Indices, PrimitiveTopology},
        render_asset::RenderAssetUsages,
    },
};
use point_cloud::PointCloudMaterial;
use rayon::prelude::*;
use std::iter::repeat_n;

use crate::prelude::*;

/// Sprite corners, counter-clockwise
const CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Uploads a point set as one sprite quad per point.
/// All four corners share the point's centre and colour, the corner offset in
/// `UV_0` is expanded to screen space by the point cloud shader.
///
/// Point sets come from a validated [`GalaxyParameters`], so they hold at most
/// [`GalaxyParameters::MAX_POINTS`] points and every index fits in a `u32`.
pub fn point_set_mesh(points: &PointSet) -> Mesh {
    debug_assert!(points.len() <= GalaxyParameters::MAX_POINTS);

    let positions: Vec<[f32; 3]> = points
        .positions
        .par_iter()
        .flat_map_iter(|position| repeat_n(*position, 4))
        .collect();

    let colors: Vec<[f32; 4]> = points
        .colors
        .par_iter()
        .flat_map_iter(|&[r, g, b]| repeat_n([r, g, b, 1.0], 4))
        .collect();

    let corners: Vec<[f32; 2]> = (0..points.len())
        .into_par_iter()
        .flat_map_iter(|_| CORNERS)
        .collect();

    let indices: Vec<u32> = (0..points.len() as u32)
        .into_par_iter()
        .flat_map_iter(|point| QUAD_INDICES.map(|i| point * 4 + i))
        .collect();

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
        .with_inserted_indices(Indices::U32(indices))
}

/// Point style for the galaxy: `size` in world units, shrinking with distance.
/// `pixel_ratio` only matters without attenuation, the viewport keeps it in
/// step with [`RenderScale`] afterwards.
pub fn point_material(params: &GalaxyParameters, pixel_ratio: f32) -> PointCloudMaterial {
    let mut material = PointCloudMaterial::new(params.size);
    material.style.pixel_ratio = pixel_ratio;
    material
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_points() -> PointSet {
        PointSet {
            positions: vec![[1.0, 2.0, 3.0], [-1.0, 0.5, 0.0]],
            colors: vec![[0.1, 0.2, 0.3], [1.0, 0.0, 0.5]],
        }
    }

    #[test]
    fn four_vertices_and_six_indices_per_point() {
        let mesh = point_set_mesh(&two_points());
        assert_eq!(mesh.count_vertices(), 8);
        assert_eq!(mesh.indices().map(|indices| indices.len()), Some(12));
    }

    #[test]
    fn corners_share_point_data() {
        let mesh = point_set_mesh(&two_points());

        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|values| values.as_float3())
            .unwrap();
        assert!(positions[..4].iter().all(|p| *p == [1.0, 2.0, 3.0]));
        assert!(positions[4..].iter().all(|p| *p == [-1.0, 0.5, 0.0]));

        let Some(bevy::render::mesh::VertexAttributeValues::Float32x4(colors)) =
            mesh.attribute(Mesh::ATTRIBUTE_COLOR)
        else {
            panic!("colors should be Float32x4");
        };
        assert!(colors[4..].iter().all(|c| *c == [1.0, 0.0, 0.5, 1.0]));
    }

    #[test]
    fn second_quad_indexes_its_own_vertices() {
        let mesh = point_set_mesh(&two_points());
        let indices: Vec<usize> = mesh.indices().unwrap().iter().collect();
        assert_eq!(&indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn empty_point_set_gives_empty_mesh() {
        let mesh = point_set_mesh(&PointSet::default());
        assert_eq!(mesh.count_vertices(), 0);
        assert_eq!(mesh.indices().map(|indices| indices.len()), Some(0));
    }

    #[test]
    fn material_uses_galaxy_point_size() {
        let params = GalaxyParameters {
            size: 0.03,
            ..default()
        };
        let material = point_material(&params, 2.0);
        assert_eq!(material.style.size, 0.03);
        assert_eq!(material.style.pixel_ratio, 2.0);
        assert!(material.size_attenuation);
        assert_eq!(material.alpha_mode, AlphaMode::Add);
    }
}
