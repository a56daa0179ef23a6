use bevy::prelude::*;

use crate::player::{MoveIntent, Player};
use crate::throw::ThrowIntent;

/// Keyboard, mouse, and gamepad adapters. These only write intent components;
/// nothing downstream knows where an input came from.
pub struct InputAdapterPlugin;

impl Plugin for InputAdapterPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (read_move_input, read_throw_input));
    }
}

fn read_move_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    mut intents: Query<&mut MoveIntent, With<Player>>,
) {
    for mut intent in intents.iter_mut() {
        let mut direction = 0.0;

        // Keyboard input
        if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
            direction -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
            direction += 1.0;
        }

        // Gamepad input
        for gamepad in gamepads.iter() {
            if let Some(axis_value) = gamepad.get(GamepadAxis::LeftStickX) {
                if axis_value.abs() > 0.1 {
                    // Deadzone
                    direction = axis_value;
                }
            }
            if gamepad.pressed(GamepadButton::DPadLeft) {
                direction = -1.0;
            }
            if gamepad.pressed(GamepadButton::DPadRight) {
                direction = 1.0;
            }
        }

        intent.direction = direction;

        // Only ever set the jump flag here; the fixed step consumes it.
        let jump_pressed = keyboard.just_pressed(KeyCode::Space)
            || keyboard.just_pressed(KeyCode::KeyW)
            || gamepads.iter().any(|g| g.just_pressed(GamepadButton::South));
        if jump_pressed {
            intent.jump = true;
        }
    }
}

fn read_throw_input(
    mouse: Res<ButtonInput<MouseButton>>,
    gamepads: Query<&Gamepad>,
    mut intents: Query<&mut ThrowIntent>,
) {
    let pressed = mouse.pressed(MouseButton::Left)
        || gamepads.iter().any(|g| g.pressed(GamepadButton::RightTrigger2));

    for mut intent in intents.iter_mut() {
        intent.pressed = pressed;
    }
}
