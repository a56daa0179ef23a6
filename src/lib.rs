//! A small 2.5D-style platformer about popping thought bubbles: pick up a
//! throwable item, charge a throw, and pop bubbles while spawners grow
//! replacements for every item that expires.
//!
//! The crate side carries all gameplay systems so they can run headless in
//! tests; the binary adds windowing, input adapters, and a camera on top.

use bevy::prelude::*;

pub mod bubble;
pub mod config;
pub mod constants;
pub mod input;
pub mod item;
pub mod level;
pub mod physics;
pub mod player;
pub mod spawner;
pub mod throw;
pub mod ui;

/// Everything gameplay: physics, the item lifecycle, respawn sequences,
/// throwing, bubbles, level assembly, tuning, and the HUD.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            config::TuningAssetPlugin,
            physics::PhysicsPlugin,
            player::PlayerPlugin,
            item::ItemPlugin,
            spawner::SpawnerPlugin,
            throw::ThrowPlugin,
            bubble::BubblePlugin,
            level::LevelPlugin,
            ui::HudPlugin,
        ));
    }
}
