//! Integration tests for pickup, carry, charge and release.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use pop_goblin_platformer::item::{Item, ItemLifetime, ItemPlugin};
use pop_goblin_platformer::physics::{Grounded, Impulse, PhysicsPlugin, Velocity};
use pop_goblin_platformer::player::Facing;
use pop_goblin_platformer::throw::{Held, JustThrown, ThrowController, ThrowIntent, ThrowPlugin};

const FRAME_HZ: f64 = 60.0;

const THROWER_SIZE: Vec2 = Vec2::new(40.0, 56.0);
const ITEM_SIZE: Vec2 = Vec2::new(24.0, 24.0);

// ThrowController::default(): max hold 2.0s, max force 700, angle 45 degrees,
// hold offset (30, 10).
const FULL_THROW_AXIS: f32 = 700.0 * std::f32::consts::FRAC_1_SQRT_2;

fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins((PhysicsPlugin, ItemPlugin, ThrowPlugin));
    app.insert_resource(Time::<Fixed>::from_hz(FRAME_HZ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / FRAME_HZ,
    )));

    app.finish();
    app.cleanup();
    // The first update initializes the clock; time advances from the next one.
    app.update();
    app
}

fn tick(app: &mut App) {
    app.update();
}

fn spawn_thrower(app: &mut App, position: Vec2, facing: Facing) -> Entity {
    app.world_mut()
        .spawn((
            Sprite {
                color: Color::WHITE,
                custom_size: Some(THROWER_SIZE),
                ..default()
            },
            Transform::from_xyz(position.x, position.y, 0.0),
            facing,
            ThrowController::default(),
            ThrowIntent::default(),
        ))
        .id()
}

fn spawn_free_item(app: &mut App, position: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Sprite {
                color: Color::WHITE,
                custom_size: Some(ITEM_SIZE),
                ..default()
            },
            Transform::from_xyz(position.x, position.y, 1.0),
            Item,
            ItemLifetime::new(5.0),
            Velocity::default(),
            Grounded(false),
        ))
        .id()
}

fn set_pressed(app: &mut App, thrower: Entity, pressed: bool) {
    app.world_mut()
        .get_mut::<ThrowIntent>(thrower)
        .unwrap()
        .pressed = pressed;
}

/// Holds the throw input for `frames` updates. Charge accrues from the
/// second pressed frame, so n frames add (n - 1) frames worth of hold time.
fn press_for_frames(app: &mut App, thrower: Entity, frames: usize) {
    set_pressed(app, thrower, true);
    for _ in 0..frames {
        tick(app);
    }
}

fn controller(app: &App, thrower: Entity) -> &ThrowController {
    app.world().get::<ThrowController>(thrower).unwrap()
}

fn count_held(app: &mut App) -> usize {
    let mut query = app.world_mut().query_filtered::<(), With<Held>>();
    query.iter(app.world()).count()
}

#[test]
fn overlapping_thrower_picks_up_exactly_one_item() {
    let mut app = create_test_app();
    let thrower = spawn_thrower(&mut app, Vec2::ZERO, Facing::Right);
    spawn_free_item(&mut app, Vec2::new(5.0, 0.0));
    spawn_free_item(&mut app, Vec2::new(-5.0, 0.0));

    tick(&mut app);
    let held = controller(&app, thrower).held_item();
    assert!(held.is_some(), "thrower should grab an overlapping item");
    assert_eq!(count_held(&mut app), 1, "only one item may be held");

    // Carried item snaps to the hold offset on the pickup frame.
    let item_transform = app.world().get::<Transform>(held.unwrap()).unwrap();
    assert_eq!(item_transform.translation.x, 30.0);
    assert_eq!(item_transform.translation.y, 10.0);

    // More frames do not stack pickups.
    for _ in 0..5 {
        tick(&mut app);
    }
    assert_eq!(count_held(&mut app), 1);
    assert_eq!(controller(&app, thrower).held_item(), held);
}

#[test]
fn carried_item_tracks_its_thrower() {
    let mut app = create_test_app();
    let thrower = spawn_thrower(&mut app, Vec2::ZERO, Facing::Right);
    let item = spawn_free_item(&mut app, Vec2::new(5.0, 0.0));

    tick(&mut app);
    assert_eq!(controller(&app, thrower).held_item(), Some(item));

    app.world_mut()
        .get_mut::<Transform>(thrower)
        .unwrap()
        .translation
        .x = 100.0;
    tick(&mut app);
    let item_transform = app.world().get::<Transform>(item).unwrap();
    assert_eq!(item_transform.translation.x, 130.0);
    assert_eq!(item_transform.translation.y, 10.0);

    // Flipping the thrower mirrors the hold offset.
    *app.world_mut().get_mut::<Facing>(thrower).unwrap() = Facing::Left;
    tick(&mut app);
    let item_transform = app.world().get::<Transform>(item).unwrap();
    assert_eq!(item_transform.translation.x, 70.0);
}

#[test]
fn full_charge_throw_launches_at_max_force() {
    let mut app = create_test_app();
    let thrower = spawn_thrower(&mut app, Vec2::ZERO, Facing::Right);
    let item = spawn_free_item(&mut app, Vec2::new(5.0, 0.0));
    tick(&mut app);

    // 2.5 seconds pressed against a 2 second max hold: clamped full power.
    press_for_frames(&mut app, thrower, 150);
    assert!(controller(&app, thrower).is_charging());
    assert_eq!(controller(&app, thrower).power(), 1.0);

    set_pressed(&mut app, thrower, false);
    tick(&mut app);

    let ctl = controller(&app, thrower);
    assert_eq!(ctl.held_item(), None);
    assert!(!ctl.is_charging());
    assert!(app.world().get::<Held>(item).is_none());
    assert!(app.world().get::<JustThrown>(item).is_some());

    // Impulse sits on the item until the next fixed step consumes it.
    let impulse = app.world().get::<Impulse>(item).unwrap();
    assert!((impulse.0.x - FULL_THROW_AXIS).abs() < 0.01);
    assert!((impulse.0.y - FULL_THROW_AXIS).abs() < 0.01);

    let lifetime = app.world().get::<ItemLifetime>(item).unwrap();
    assert!(lifetime.armed(), "release must start the countdown");

    tick(&mut app);
    assert!(app.world().get::<Impulse>(item).is_none());
    let velocity = app.world().get::<Velocity>(item).unwrap();
    assert!((velocity.x - FULL_THROW_AXIS).abs() < 0.01);
    assert!(velocity.y > 400.0, "upward launch, minus one gravity step");

    // The item flies clear instead of being grabbed straight back.
    for _ in 0..60 {
        tick(&mut app);
    }
    assert_eq!(controller(&app, thrower).held_item(), None);
    assert!(app.world().get::<Held>(item).is_none());
}

#[test]
fn instant_release_drops_with_zero_power() {
    let mut app = create_test_app();
    let thrower = spawn_thrower(&mut app, Vec2::ZERO, Facing::Right);
    let item = spawn_free_item(&mut app, Vec2::new(5.0, 0.0));
    tick(&mut app);

    // One pressed frame, then release: no hold time has accrued.
    press_for_frames(&mut app, thrower, 1);
    set_pressed(&mut app, thrower, false);
    tick(&mut app);

    let impulse = app.world().get::<Impulse>(item).unwrap();
    assert_eq!(impulse.0, Vec2::ZERO);
    assert!(app.world().get::<Held>(item).is_none());
    assert!(
        app.world().get::<ItemLifetime>(item).unwrap().armed(),
        "even a dropped item is armed"
    );
}

#[test]
fn half_charge_scales_the_impulse() {
    let mut app = create_test_app();
    let thrower = spawn_thrower(&mut app, Vec2::ZERO, Facing::Right);
    let item = spawn_free_item(&mut app, Vec2::new(5.0, 0.0));
    tick(&mut app);

    // 60 accrual frames = 1.0s of a 2.0s max hold.
    press_for_frames(&mut app, thrower, 61);
    set_pressed(&mut app, thrower, false);
    tick(&mut app);

    let impulse = app.world().get::<Impulse>(item).unwrap();
    assert!((impulse.0.length() - 350.0).abs() < 1.0);
    assert!((impulse.0.x - FULL_THROW_AXIS * 0.5).abs() < 1.0);
}

#[test]
fn facing_left_mirrors_the_throw() {
    let mut app = create_test_app();
    let thrower = spawn_thrower(&mut app, Vec2::ZERO, Facing::Left);
    let item = spawn_free_item(&mut app, Vec2::new(-5.0, 0.0));
    tick(&mut app);

    // Mirrored hold offset.
    let item_transform = app.world().get::<Transform>(item).unwrap();
    assert_eq!(item_transform.translation.x, -30.0);

    press_for_frames(&mut app, thrower, 150);
    set_pressed(&mut app, thrower, false);
    tick(&mut app);

    let impulse = app.world().get::<Impulse>(item).unwrap();
    assert!((impulse.0.x + FULL_THROW_AXIS).abs() < 0.01, "throw goes left");
    assert!((impulse.0.y - FULL_THROW_AXIS).abs() < 0.01, "arc still goes up");
}

#[test]
fn dropped_item_can_be_picked_up_again_after_clearing() {
    let mut app = create_test_app();
    let thrower = spawn_thrower(&mut app, Vec2::ZERO, Facing::Right);
    let item = spawn_free_item(&mut app, Vec2::new(5.0, 0.0));
    tick(&mut app);

    press_for_frames(&mut app, thrower, 1);
    set_pressed(&mut app, thrower, false);
    tick(&mut app);
    assert!(app.world().get::<JustThrown>(item).is_some());

    // The dropped item falls out of the thrower's box, clearing the
    // thrown marker without being grabbed back.
    for _ in 0..60 {
        tick(&mut app);
    }
    assert!(app.world().get::<JustThrown>(item).is_none());
    assert_eq!(controller(&app, thrower).held_item(), None);

    // Back in reach, it is an ordinary pickup again.
    {
        let world = app.world_mut();
        let mut transform = world.get_mut::<Transform>(item).unwrap();
        transform.translation.x = 0.0;
        transform.translation.y = 0.0;
        let mut velocity = world.get_mut::<Velocity>(item).unwrap();
        velocity.x = 0.0;
        velocity.y = 0.0;
    }
    tick(&mut app);
    assert_eq!(controller(&app, thrower).held_item(), Some(item));
}

#[test]
fn item_without_a_lifetime_still_throws_and_never_expires() {
    let mut app = create_test_app();
    let thrower = spawn_thrower(&mut app, Vec2::ZERO, Facing::Right);
    let item = app
        .world_mut()
        .spawn((
            Sprite {
                color: Color::WHITE,
                custom_size: Some(ITEM_SIZE),
                ..default()
            },
            Transform::from_xyz(5.0, 0.0, 1.0),
            Item,
            Velocity::default(),
            Grounded(false),
        ))
        .id();

    tick(&mut app);
    assert_eq!(controller(&app, thrower).held_item(), Some(item));

    press_for_frames(&mut app, thrower, 150);
    set_pressed(&mut app, thrower, false);
    tick(&mut app);

    let impulse = app.world().get::<Impulse>(item).unwrap();
    assert!((impulse.0.x - FULL_THROW_AXIS).abs() < 0.01);
    assert!(app.world().get::<Held>(item).is_none());

    // Nothing to arm, so the item simply keeps existing.
    for _ in 0..600 {
        tick(&mut app);
    }
    assert!(app.world().get::<Item>(item).is_some());
}

#[test]
fn losing_the_held_item_resets_the_controller() {
    let mut app = create_test_app();
    let thrower = spawn_thrower(&mut app, Vec2::ZERO, Facing::Right);
    let item = spawn_free_item(&mut app, Vec2::new(5.0, 0.0));
    tick(&mut app);
    assert_eq!(controller(&app, thrower).held_item(), Some(item));

    // Charge a bit, then yank the item out from under the controller.
    press_for_frames(&mut app, thrower, 30);
    app.world_mut().despawn(item);
    tick(&mut app);

    let ctl = controller(&app, thrower);
    assert_eq!(ctl.held_item(), None);
    assert!(!ctl.is_charging(), "charge state dies with the item");

    // Pressing with empty hands does nothing.
    tick(&mut app);
    assert!(!controller(&app, thrower).is_charging());

    // A fresh item is picked up as normal.
    let replacement = spawn_free_item(&mut app, Vec2::new(5.0, 0.0));
    set_pressed(&mut app, thrower, false);
    tick(&mut app);
    assert_eq!(controller(&app, thrower).held_item(), Some(replacement));
}
