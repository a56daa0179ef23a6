use bevy::prelude::*;

use crate::physics::{Grounded, Velocity};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            apply_move_intent.before(crate::physics::PhysicsSet),
        )
        .add_systems(Update, update_facing);
    }
}

#[derive(Component)]
pub struct Player {
    pub move_speed: f32,
    pub jump_force: f32,
}

/// Horizontal orientation; throws and the carry offset mirror with it.
#[derive(Component, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// Input indirection for movement; adapters write it, the fixed step reads it.
#[derive(Component, Default)]
pub struct MoveIntent {
    pub direction: f32,
    pub jump: bool,
}

pub fn spawn_player(commands: &mut Commands, tuning: &crate::config::Tuning) -> Entity {
    commands
        .spawn((
            Sprite {
                color: crate::constants::PLAYER_COLOR,
                custom_size: Some(crate::constants::PLAYER_SIZE),
                ..default()
            },
            Transform::from_xyz(tuning.level.player_spawn.0, tuning.level.player_spawn.1, 1.0),
            Player {
                move_speed: tuning.player.move_speed,
                jump_force: tuning.player.jump_force,
            },
            Facing::default(),
            MoveIntent::default(),
            Velocity::default(),
            Grounded(false),
            crate::throw::ThrowController::new(&tuning.throw),
            crate::throw::ThrowIntent::default(),
            crate::level::LevelEntity,
        ))
        .id()
}

fn apply_move_intent(mut players: Query<(&Player, &mut MoveIntent, &mut Velocity, &Grounded)>) {
    for (player, mut intent, mut velocity, grounded) in players.iter_mut() {
        velocity.x = intent.direction * player.move_speed;

        // Jump is edge-triggered; consume it whether or not it lands so a
        // press in the air does not buffer into a later landing.
        if intent.jump {
            intent.jump = false;
            if grounded.0 {
                velocity.y = player.jump_force;
            }
        }
    }
}

fn update_facing(mut players: Query<(&MoveIntent, &mut Facing, &mut Sprite), With<Player>>) {
    for (intent, mut facing, mut sprite) in players.iter_mut() {
        if intent.direction > 0.0 {
            *facing = Facing::Right;
        } else if intent.direction < 0.0 {
            *facing = Facing::Left;
        }
        sprite.flip_x = *facing == Facing::Left;
    }
}
