use bevy::prelude::*;

use crate::item::{Item, ItemLifetime};
use crate::physics::{aabb_overlap, Impulse, Velocity};
use crate::player::Facing;

pub struct ThrowPlugin;

impl Plugin for ThrowPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (
            clear_thrown_items,
            pickup_items,
            charge_and_release,
            carry_held_items,
        ).chain().before(crate::item::ItemLifecycleSet));
    }
}

/// Charge-and-release throwing. At most one item is held at a time; the
/// handle is cleared on release so the same item cannot be thrown twice.
#[derive(Component)]
pub struct ThrowController {
    pub max_hold_time: f32,
    pub max_throw_force: f32,
    pub throw_angle_degrees: f32,
    pub hold_offset: Vec2,
    held_item: Option<Entity>,
    hold_time: f32,
    charging: bool,
}

impl ThrowController {
    pub fn new(tuning: &crate::config::ThrowTuning) -> Self {
        Self {
            max_hold_time: tuning.max_hold_time,
            max_throw_force: tuning.max_throw_force,
            throw_angle_degrees: tuning.throw_angle_degrees,
            hold_offset: Vec2::new(tuning.hold_offset.0, tuning.hold_offset.1),
            held_item: None,
            hold_time: 0.0,
            charging: false,
        }
    }

    pub fn held_item(&self) -> Option<Entity> {
        self.held_item
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }

    /// Charge fraction in [0, 1]: hold time over max hold time.
    pub fn power(&self) -> f32 {
        if self.max_hold_time <= 0.0 {
            return 0.0;
        }
        (self.hold_time / self.max_hold_time).clamp(0.0, 1.0)
    }

    pub fn throw_direction(&self, facing: Facing) -> Vec2 {
        let angle = self.throw_angle_degrees.to_radians();
        Vec2::new(angle.cos() * facing.sign(), angle.sin())
    }
}

impl Default for ThrowController {
    fn default() -> Self {
        Self::new(&crate::config::ThrowTuning::default())
    }
}

/// Marks an item as carried: physics leaves it alone and the carry system
/// pins it to its thrower.
#[derive(Component)]
pub struct Held;

/// Input indirection for throwing; adapters write it, systems read it, tests
/// set it directly.
#[derive(Component, Default)]
pub struct ThrowIntent {
    pub pressed: bool,
}

/// A released item still overlaps its thrower on the release frame. This
/// blocks pickup until the item has cleared the thrower once, so a throw is
/// not immediately undone.
#[derive(Component)]
pub struct JustThrown;

fn clear_thrown_items(
    mut commands: Commands,
    throwers: Query<(&Transform, &Sprite), With<ThrowController>>,
    thrown: Query<(Entity, &Transform, &Sprite), (With<Item>, With<JustThrown>)>,
) {
    for (item_entity, item_transform, item_sprite) in thrown.iter() {
        let item_size = item_sprite.custom_size.unwrap_or(Vec2::ONE);
        let clear = throwers.iter().all(|(thrower_transform, thrower_sprite)| {
            !aabb_overlap(
                item_transform.translation,
                item_size,
                thrower_transform.translation,
                thrower_sprite.custom_size.unwrap_or(Vec2::ONE),
            )
        });
        if clear {
            commands.entity(item_entity).remove::<JustThrown>();
        }
    }
}

fn pickup_items(
    mut commands: Commands,
    mut throwers: Query<(&Transform, &Sprite, &mut ThrowController)>,
    mut free_items: Query<
        (Entity, &Transform, &Sprite, &mut Velocity),
        (
            With<Item>,
            Without<Held>,
            Without<JustThrown>,
            Without<ThrowController>,
        ),
    >,
    items_alive: Query<(), With<Item>>,
) {
    for (thrower_transform, thrower_sprite, mut controller) in throwers.iter_mut() {
        if let Some(held) = controller.held_item {
            if items_alive.contains(held) {
                continue;
            }
            // The held item expired or was despawned out from under us.
            controller.held_item = None;
            controller.charging = false;
            controller.hold_time = 0.0;
        }

        let thrower_size = thrower_sprite.custom_size.unwrap_or(Vec2::ONE);
        for (item_entity, item_transform, item_sprite, mut velocity) in free_items.iter_mut() {
            let item_size = item_sprite.custom_size.unwrap_or(Vec2::ONE);
            if !aabb_overlap(
                thrower_transform.translation,
                thrower_size,
                item_transform.translation,
                item_size,
            ) {
                continue;
            }

            velocity.x = 0.0;
            velocity.y = 0.0;
            commands.entity(item_entity).insert(Held);
            controller.held_item = Some(item_entity);
            break;
        }
    }
}

fn charge_and_release(
    mut commands: Commands,
    mut throwers: Query<(&ThrowIntent, &Facing, &mut ThrowController)>,
    mut held_items: Query<Option<&mut ItemLifetime>, (With<Item>, With<Held>)>,
    time: Res<Time<Virtual>>,
) {
    for (intent, facing, mut controller) in throwers.iter_mut() {
        let Some(held) = controller.held_item else {
            controller.charging = false;
            controller.hold_time = 0.0;
            continue;
        };

        if intent.pressed {
            if !controller.charging {
                controller.charging = true;
                controller.hold_time = 0.0;
            } else {
                controller.hold_time =
                    (controller.hold_time + time.delta_secs()).min(controller.max_hold_time);
            }
        } else if controller.charging {
            controller.charging = false;
            let power = controller.power();
            let impulse = controller.throw_direction(*facing) * power * controller.max_throw_force;
            controller.hold_time = 0.0;
            controller.held_item = None;

            if let Ok(mut lifetime) = held_items.get_mut(held) {
                commands
                    .entity(held)
                    .remove::<Held>()
                    .insert((Impulse(impulse), JustThrown));
                if let Some(lifetime) = lifetime.as_mut() {
                    lifetime.arm();
                }
            }
        }
    }
}

fn carry_held_items(
    throwers: Query<(&Transform, &Facing, &ThrowController), Without<Held>>,
    mut held_items: Query<&mut Transform, With<Held>>,
) {
    for (thrower_transform, facing, controller) in throwers.iter() {
        let Some(held) = controller.held_item() else {
            continue;
        };
        let Ok(mut item_transform) = held_items.get_mut(held) else {
            continue;
        };

        item_transform.translation.x =
            thrower_transform.translation.x + controller.hold_offset.x * facing.sign();
        item_transform.translation.y = thrower_transform.translation.y + controller.hold_offset.y;
    }
}
