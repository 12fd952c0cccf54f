use bevy::{
    pbr::NotShadowCaster,
    platform::time::Instant,
    prelude::*,
    render::view::NoFrustumCulling,
};
use point_cloud::PointCloudMaterial;
use rand::{rngs::StdRng, SeedableRng};

use super::{generate_galaxy, GalaxyParameters};
use crate::graphics::{point_material, point_set_mesh};
use crate::prelude::*;

pub struct SpawnPointsPlugin;

impl Plugin for SpawnPointsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointCount>()
            .init_resource::<GalaxyPointsControl>()
            .add_event::<RegenerateGalaxy>()
            .add_systems(Startup, seed_galaxy_rng)
            .add_systems(Update, rebuild_galaxy);
    }
}

/// Points currently on screen, and how many times the cloud has been rebuilt
#[derive(Resource, Default, Debug)]
pub struct PointCount {
    pub count: usize,
    pub generation: u32,
}

/// Source of every random draw the generator makes
#[derive(Resource)]
pub struct GalaxyRng(pub StdRng);

/// Rebuild with unchanged parameters, which re-rolls the point placement
#[derive(Event, Clone, Copy, Debug)]
pub struct RegenerateGalaxy;

/// Marks the single entity holding the displayed point cloud
#[derive(Component)]
pub struct GalaxyPoints;

/// Snapshot of the parameters the current cloud was built from
#[derive(Resource, Default)]
struct GalaxyPointsControl {
    built: Option<GalaxyParameters>,
}

fn seed_galaxy_rng(mut commands: Commands, config: Res<ViewerConfig>) {
    let seed = config.seed.unwrap_or_else(|| rand::random());
    info!("Galaxy seed {seed}, set GALAXY_SEED to reproduce");
    commands.insert_resource(GalaxyRng(StdRng::seed_from_u64(seed)));
}

/// Replaces the point cloud whenever the parameters differ from the ones it was
/// built from, or a regeneration was requested.
///
/// The old mesh and material are released before the new cloud is built.
/// Despawn and spawn go through the same command queue, so no frame ever
/// shows both clouds.
fn rebuild_galaxy(
    mut commands: Commands,
    params: Res<GalaxyParameters>,
    mut rng: ResMut<GalaxyRng>,
    mut control: ResMut<GalaxyPointsControl>,
    mut point_count: ResMut<PointCount>,
    mut regenerate: EventReader<RegenerateGalaxy>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<PointCloudMaterial>>,
    existing: Query<(Entity, &Mesh3d, &MeshMaterial3d<PointCloudMaterial>), With<GalaxyPoints>>,
    render_scale: Res<RenderScale>,
) -> Result {
    let requested = regenerate.read().count() > 0;
    if !requested && control.built.as_ref() == Some(&*params) {
        return Ok(());
    }

    params.validate()?;
    let started = Instant::now();

    for (entity, mesh, material) in &existing {
        meshes.remove(&mesh.0);
        materials.remove(&material.0);
        commands.entity(entity).despawn();
    }

    let points = generate_galaxy(&params, &mut rng.0)?;

    if points.is_empty() {
        debug!("Galaxy is empty, nothing to attach");
    } else {
        commands.spawn((
            Mesh3d(meshes.add(point_set_mesh(&points))),
            MeshMaterial3d(materials.add(point_material(&params, render_scale.pixel_ratio))),
            Transform::IDENTITY,
            Visibility::Inherited,
            NoFrustumCulling,
            NotShadowCaster,
            GalaxyPoints,
        ));
    }

    control.built = Some(params.clone());
    point_count.count = points.len();
    point_count.generation += 1;

    info!(
        "Built galaxy #{} with {} points in {:.1?}",
        point_count.generation,
        points.len(),
        started.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(params: GalaxyParameters) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<PointCloudMaterial>>()
            .init_resource::<PointCount>()
            .init_resource::<GalaxyPointsControl>()
            .insert_resource(RenderScale {
                pixel_ratio: 1.5,
                ..default()
            })
            .add_event::<RegenerateGalaxy>()
            .insert_resource(params)
            .insert_resource(GalaxyRng(StdRng::seed_from_u64(9)))
            .add_systems(Update, rebuild_galaxy);
        app
    }

    fn attached(app: &mut App) -> usize {
        let world = app.world_mut();
        world
            .query_filtered::<Entity, With<GalaxyPoints>>()
            .iter(world)
            .count()
    }

    fn assets(app: &App) -> (usize, usize) {
        let world = app.world();
        (
            world.resource::<Assets<Mesh>>().len(),
            world.resource::<Assets<PointCloudMaterial>>().len(),
        )
    }

    fn small() -> GalaxyParameters {
        GalaxyParameters {
            count: 300,
            ..default()
        }
    }

    #[test]
    fn first_update_attaches_one_cloud() {
        let mut app = test_app(small());
        app.update();

        assert_eq!(attached(&mut app), 1);
        assert_eq!(assets(&app), (1, 1));
        let count = app.world().resource::<PointCount>();
        assert_eq!(count.count, 300);
        assert_eq!(count.generation, 1);
    }

    #[test]
    fn unchanged_parameters_do_not_rebuild() {
        let mut app = test_app(small());
        app.update();
        app.update();
        app.update();

        assert_eq!(app.world().resource::<PointCount>().generation, 1);
        assert_eq!(attached(&mut app), 1);
    }

    #[test]
    fn rebuilding_twice_leaves_exactly_one_cloud() {
        let mut app = test_app(small());
        app.update();

        app.world_mut().resource_mut::<GalaxyParameters>().count = 500;
        app.update();
        assert_eq!(attached(&mut app), 1);
        assert_eq!(assets(&app), (1, 1));

        app.world_mut().resource_mut::<GalaxyParameters>().spin = -2.0;
        app.update();
        assert_eq!(attached(&mut app), 1);
        assert_eq!(assets(&app), (1, 1));

        let count = app.world().resource::<PointCount>();
        assert_eq!(count.count, 500);
        assert_eq!(count.generation, 3);
    }

    #[test]
    fn new_material_carries_point_size() {
        let mut app = test_app(small());
        app.update();
        app.world_mut().resource_mut::<GalaxyParameters>().size = 0.05;
        app.update();

        let materials = app.world().resource::<Assets<PointCloudMaterial>>();
        let (_, material) = materials.iter().next().unwrap();
        assert_eq!(material.style.size, 0.05);
        assert_eq!(material.style.pixel_ratio, 1.5);
    }

    #[test]
    fn regenerate_event_rebuilds_with_same_parameters() {
        let mut app = test_app(small());
        app.update();

        app.world_mut().send_event(RegenerateGalaxy);
        app.update();

        assert_eq!(app.world().resource::<PointCount>().generation, 2);
        assert_eq!(attached(&mut app), 1);
        assert_eq!(assets(&app), (1, 1));
    }

    #[test]
    fn empty_galaxy_releases_the_old_cloud() {
        let mut app = test_app(small());
        app.update();

        app.world_mut().resource_mut::<GalaxyParameters>().count = 0;
        app.update();

        assert_eq!(attached(&mut app), 0);
        assert_eq!(assets(&app), (0, 0));
        let count = app.world().resource::<PointCount>();
        assert_eq!(count.count, 0);
        assert_eq!(count.generation, 2);
    }
}
