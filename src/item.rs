use bevy::prelude::*;
use std::time::Duration;

pub struct ItemPlugin;

/// Lifetime ticking and expiry despawns run here; the respawn machinery is
/// ordered after this set so expiry notifications are handled the same frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemLifecycleSet;

impl Plugin for ItemPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ItemExpired>()
            .add_systems(Update, (
                auto_arm_items,
                tick_item_lifetimes,
            ).chain().in_set(ItemLifecycleSet));
    }
}

#[derive(Component)]
pub struct Item;

/// Countdown that starts the first time the item is armed (thrown). Arming is
/// idempotent: repeated calls never restart or extend a running countdown.
#[derive(Component)]
pub struct ItemLifetime {
    lifetime: Duration,
    countdown: Option<Timer>,
    auto_arm: bool,
}

impl ItemLifetime {
    pub fn new(lifetime_secs: f32) -> Self {
        Self {
            lifetime: Duration::from_secs_f32(lifetime_secs),
            countdown: None,
            auto_arm: false,
        }
    }

    pub fn with_auto_arm(lifetime_secs: f32) -> Self {
        Self {
            auto_arm: true,
            ..Self::new(lifetime_secs)
        }
    }

    pub fn arm(&mut self) {
        if self.countdown.is_none() {
            self.countdown = Some(Timer::new(self.lifetime, TimerMode::Once));
        }
    }

    pub fn armed(&self) -> bool {
        self.countdown.is_some()
    }

    /// Advances the countdown if armed. Returns true on the tick the item
    /// expires.
    pub fn tick(&mut self, delta: Duration) -> bool {
        match self.countdown.as_mut() {
            Some(countdown) => countdown.tick(delta).just_finished(),
            None => false,
        }
    }
}

/// Non-owning handle back to the spawner that produced this item. The spawner
/// may be long gone by the time the item expires.
#[derive(Component)]
pub struct SpawnedBy(pub Entity);

#[derive(Event)]
pub struct ItemExpired {
    pub spawner: Entity,
}

/// Everything needed to build one item entity; spawners keep a copy so
/// replacements match the original.
#[derive(Clone)]
pub struct ItemSpec {
    pub size: Vec2,
    pub color: Color,
    pub lifetime_secs: f32,
    pub auto_arm: bool,
}

pub fn spawn_item(
    commands: &mut Commands,
    spec: &ItemSpec,
    position: Vec3,
    spawner: Option<Entity>,
) -> Entity {
    let lifetime = if spec.auto_arm {
        ItemLifetime::with_auto_arm(spec.lifetime_secs)
    } else {
        ItemLifetime::new(spec.lifetime_secs)
    };

    let mut item = commands.spawn((
        Sprite {
            color: spec.color,
            custom_size: Some(spec.size),
            ..default()
        },
        Transform::from_translation(position),
        Item,
        lifetime,
        crate::physics::Velocity::default(),
        crate::physics::Grounded(false),
        crate::level::LevelEntity,
    ));

    if let Some(spawner) = spawner {
        item.insert(SpawnedBy(spawner));
    }

    item.id()
}

fn auto_arm_items(mut items: Query<&mut ItemLifetime, With<Item>>) {
    for mut lifetime in items.iter_mut() {
        if lifetime.auto_arm {
            lifetime.arm();
        }
    }
}

fn tick_item_lifetimes(
    mut commands: Commands,
    mut items: Query<(Entity, &mut ItemLifetime, Option<&SpawnedBy>), With<Item>>,
    mut expired: EventWriter<ItemExpired>,
    time: Res<Time<Virtual>>,
) {
    for (entity, mut lifetime, spawned_by) in items.iter_mut() {
        if !lifetime.tick(time.delta()) {
            continue;
        }

        // Notify before the despawn command so the spawner can react this
        // frame even though the item entity is already doomed.
        if let Some(spawned_by) = spawned_by {
            expired.send(ItemExpired {
                spawner: spawned_by.0,
            });
        }
        commands.entity(entity).despawn();
    }
}
