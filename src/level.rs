use bevy::prelude::*;

use crate::config::Tuning;
use crate::physics::aabb_overlap;

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LevelReset>().add_systems(
            Update,
            (spawn_level, detect_reset_zone, apply_level_reset).chain(),
        );
    }
}

/// Everything that gets torn down and rebuilt on a level reset.
#[derive(Component)]
pub struct LevelEntity;

/// Trigger region that resets the level when the player falls into it.
#[derive(Component)]
pub struct ResetZone {
    pub size: Vec2,
}

#[derive(Event)]
pub struct LevelReset;

fn spawn_level(
    mut commands: Commands,
    tuning: Option<Res<Tuning>>,
    level_entities: Query<(), With<LevelEntity>>,
) {
    // Only build once; a reset clears every LevelEntity and we rebuild here
    // on the following frame.
    if !level_entities.is_empty() {
        return;
    }
    let Some(tuning) = tuning else { return };

    info!("Building level");

    crate::player::spawn_player(&mut commands, &tuning);

    for platform in &tuning.level.platforms {
        spawn_platform(
            &mut commands,
            Vec3::new(platform.position.0, platform.position.1, 0.0),
            Vec2::new(platform.size.0, platform.size.1),
        );
    }

    for &(x, y) in &tuning.level.spawners {
        commands.spawn((
            Transform::from_xyz(x, y, 0.0),
            crate::spawner::ItemSpawner::from_tuning(&tuning),
            LevelEntity,
        ));
    }

    for site in &tuning.level.bubbles {
        crate::bubble::spawn_bubble_site(
            &mut commands,
            &tuning,
            Vec2::new(site.position.0, site.position.1),
            site.npc_position.map(|(x, y)| Vec2::new(x, y)),
        );
    }

    commands.spawn((
        Transform::from_xyz(
            tuning.level.reset_zone_position.0,
            tuning.level.reset_zone_position.1,
            0.0,
        ),
        ResetZone {
            size: Vec2::new(
                tuning.level.reset_zone_size.0,
                tuning.level.reset_zone_size.1,
            ),
        },
        LevelEntity,
    ));
}

fn spawn_platform(commands: &mut Commands, position: Vec3, size: Vec2) {
    commands.spawn((
        Sprite {
            color: crate::constants::PLATFORM_COLOR,
            custom_size: Some(size),
            ..default()
        },
        Transform::from_translation(position),
        crate::physics::Ground,
        LevelEntity,
    ));
}

fn detect_reset_zone(
    players: Query<(&Transform, &Sprite), With<crate::player::Player>>,
    zones: Query<(&Transform, &ResetZone)>,
    mut resets: EventWriter<LevelReset>,
) {
    for (player_transform, player_sprite) in players.iter() {
        let player_size = player_sprite.custom_size.unwrap_or(Vec2::ONE);
        for (zone_transform, zone) in zones.iter() {
            if aabb_overlap(
                player_transform.translation,
                player_size,
                zone_transform.translation,
                zone.size,
            ) {
                info!("Player fell out of the level; resetting");
                resets.send(LevelReset);
                return;
            }
        }
    }
}

fn apply_level_reset(
    mut commands: Commands,
    mut resets: EventReader<LevelReset>,
    level_entities: Query<Entity, With<LevelEntity>>,
) {
    if resets.is_empty() {
        return;
    }
    resets.clear();

    for entity in level_entities.iter() {
        commands.entity(entity).despawn();
    }
}
