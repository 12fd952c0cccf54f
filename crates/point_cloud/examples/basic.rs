use bevy::{
    prelude::*,
    render::{
        mesh::{Indices, PrimitiveTopology},
        render_asset::RenderAssetUsages,
    },
};
use point_cloud::{PointCloudMaterial, PointCloudPlugin};

const CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(PointCloudPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, rotator_system)
        .run();
}

#[derive(Component)]
struct Rotating;

/// Points spread evenly over a unit sphere, coloured by height
fn fibonacci_sphere(count: u32) -> Mesh {
    let golden_angle = std::f32::consts::PI * (3.0 - 5f32.sqrt());

    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut colors = Vec::new();
    let mut indices = Vec::new();
    for i in 0..count {
        let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
        let ring = (1.0 - y * y).sqrt();
        let theta = golden_angle * i as f32;
        let center = [theta.cos() * ring, y, theta.sin() * ring];
        let t = (y + 1.0) * 0.5;

        let base = i * 4;
        for corner in CORNERS {
            positions.push(center);
            uvs.push(corner);
            colors.push([1.0 - t, 0.3, t, 1.0]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
        .with_inserted_indices(Indices::U32(indices))
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<PointCloudMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(fibonacci_sphere(20_000))),
        MeshMaterial3d(materials.add(PointCloudMaterial::new(0.02))),
        Transform::IDENTITY,
        Rotating,
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 1.0, 3.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn rotator_system(time: Res<Time>, mut query: Query<&mut Transform, With<Rotating>>) {
    for mut transform in &mut query {
        transform.rotate_y(0.3 * time.delta_secs());
    }
}
