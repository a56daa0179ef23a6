use bevy::prelude::*;

use crate::throw::Held;

pub struct PhysicsPlugin;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhysicsSet;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, (
            apply_impulses,
            apply_gravity,
            apply_velocity,
            check_ground_collision,
        ).chain().in_set(PhysicsSet));
    }
}

#[derive(Component, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

#[derive(Component)]
pub struct Grounded(pub bool);

#[derive(Component)]
pub struct Ground;

/// One-shot velocity change queued outside the fixed step (throws, knockbacks).
/// Consumed at the start of the next fixed tick.
#[derive(Component)]
pub struct Impulse(pub Vec2);

pub fn aabb_overlap(pos1: Vec3, size1: Vec2, pos2: Vec3, size2: Vec2) -> bool {
    let half1 = size1 / 2.0;
    let half2 = size2 / 2.0;

    pos1.x - half1.x < pos2.x + half2.x
        && pos1.x + half1.x > pos2.x - half2.x
        && pos1.y - half1.y < pos2.y + half2.y
        && pos1.y + half1.y > pos2.y - half2.y
}

fn apply_impulses(
    mut commands: Commands,
    mut query: Query<(Entity, &mut Velocity, &Impulse)>,
) {
    for (entity, mut velocity, impulse) in query.iter_mut() {
        velocity.x += impulse.0.x;
        velocity.y += impulse.0.y;
        commands.entity(entity).remove::<Impulse>();
    }
}

fn apply_gravity(
    mut query: Query<(&mut Velocity, &Grounded), Without<Held>>,
    time: Res<Time>,
) {
    for (mut velocity, grounded) in query.iter_mut() {
        if !grounded.0 {
            velocity.y += crate::constants::GRAVITY * time.delta_secs();
        }
    }
}

fn apply_velocity(
    mut query: Query<(&mut Transform, &Velocity), Without<Held>>,
    time: Res<Time>,
) {
    for (mut transform, velocity) in query.iter_mut() {
        transform.translation.x += velocity.x * time.delta_secs();
        transform.translation.y += velocity.y * time.delta_secs();
    }
}

fn check_ground_collision(
    mut body_query: Query<(&mut Transform, &Sprite, &mut Velocity, &mut Grounded), (Without<Ground>, Without<Held>)>,
    ground_query: Query<(&Transform, &Sprite), With<Ground>>,
) {
    for (mut body_transform, body_sprite, mut velocity, mut grounded) in body_query.iter_mut() {
        let body_size = body_sprite.custom_size.unwrap_or(Vec2::ONE);
        let body_bottom = body_transform.translation.y - body_size.y / 2.0;
        let body_left = body_transform.translation.x - body_size.x / 2.0;
        let body_right = body_transform.translation.x + body_size.x / 2.0;

        grounded.0 = false;

        for (ground_transform, ground_sprite) in ground_query.iter() {
            let ground_size = ground_sprite.custom_size.unwrap_or(Vec2::ONE);
            let ground_top = ground_transform.translation.y + ground_size.y / 2.0;
            let ground_left = ground_transform.translation.x - ground_size.x / 2.0;
            let ground_right = ground_transform.translation.x + ground_size.x / 2.0;

            // Check if body is above ground and overlapping horizontally
            if body_right > ground_left && body_left < ground_right {
                // Check if body is close to ground and moving downward
                if body_bottom <= ground_top && body_bottom > ground_top - crate::constants::GROUND_SNAP_DISTANCE && velocity.y <= 0.0 {
                    grounded.0 = true;
                    velocity.y = 0.0;
                    // Snap position to ground surface to prevent clipping
                    body_transform.translation.y = ground_top + body_size.y / 2.0;
                    break;
                }
            }
        }
    }
}
