use bevy::prelude::*;

use crate::item::{spawn_item, ItemExpired, ItemSpec};

pub struct SpawnerPlugin;

impl Plugin for SpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SpawnFault>()
            .init_resource::<PopSound>()
            .add_systems(Update, (
                spawn_initial_items,
                begin_respawn_sequences,
                advance_respawn_sequences,
            ).chain().after(crate::item::ItemLifecycleSet));
    }
}

/// Fixed spawn point that owns one item at a time and replays the pop
/// sequence whenever its current item expires.
#[derive(Component)]
pub struct ItemSpawner {
    pub item: Option<ItemSpec>,
    pub effect: Option<EffectSpec>,
    pub respawn_delay: f32,
    pub rise_amount: f32,
    pub rise_time: f32,
    pub pop_visible_time: f32,
}

impl ItemSpawner {
    pub fn from_tuning(tuning: &crate::config::Tuning) -> Self {
        Self {
            item: Some(ItemSpec {
                size: Vec2::new(tuning.item.size.0, tuning.item.size.1),
                color: Color::srgb(tuning.item.color.0, tuning.item.color.1, tuning.item.color.2),
                lifetime_secs: tuning.item.lifetime,
                auto_arm: tuning.item.debug_auto_arm,
            }),
            effect: Some(EffectSpec {
                size: Vec2::new(tuning.respawn.effect_size.0, tuning.respawn.effect_size.1),
                color: Color::srgb(
                    tuning.respawn.effect_color.0,
                    tuning.respawn.effect_color.1,
                    tuning.respawn.effect_color.2,
                ),
                popped_color: Color::srgb(
                    tuning.respawn.effect_popped_color.0,
                    tuning.respawn.effect_popped_color.1,
                    tuning.respawn.effect_popped_color.2,
                ),
            }),
            respawn_delay: tuning.respawn.respawn_delay,
            rise_amount: tuning.respawn.rise_amount,
            rise_time: tuning.respawn.rise_time,
            pop_visible_time: tuning.respawn.pop_visible_time,
        }
    }
}

#[derive(Clone)]
pub struct EffectSpec {
    pub size: Vec2,
    pub color: Color,
    pub popped_color: Color,
}

/// Marker for the growing-plant effect a spawner animates before the
/// replacement item appears.
#[derive(Component)]
pub struct PopEffect;

// One stage at a time; the timer always belongs to the current stage.
#[derive(Component)]
pub struct RespawnSequence {
    stage: RespawnStage,
    timer: Timer,
}

#[derive(Clone, Copy)]
enum RespawnStage {
    /// Waiting out the respawn delay before anything becomes visible.
    Delay,
    /// Effect rises from the spawn point toward its popped position.
    Rise { effect: Entity, from: Vec3 },
    /// Popped effect stays visible before being swapped for the item.
    PopHold { effect: Entity },
}

impl RespawnSequence {
    pub fn new(delay_secs: f32) -> Self {
        Self {
            stage: RespawnStage::Delay,
            timer: Timer::from_seconds(delay_secs, TimerMode::Once),
        }
    }
}

#[derive(Resource, Default)]
pub struct PopSound(pub Option<Handle<AudioSource>>);

/// Emitted alongside the log warning whenever a spawner cannot complete a
/// spawn, so tests and tooling can observe the failure.
#[derive(Event)]
pub struct SpawnFault {
    pub spawner: Entity,
    pub reason: SpawnFaultReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnFaultReason {
    MissingItem,
    MissingEffect,
}

fn spawn_initial_items(
    mut commands: Commands,
    mut faults: EventWriter<SpawnFault>,
    spawners: Query<(Entity, &Transform, &ItemSpawner), Added<ItemSpawner>>,
) {
    for (entity, transform, spawner) in spawners.iter() {
        match &spawner.item {
            Some(spec) => {
                spawn_item(&mut commands, spec, transform.translation, Some(entity));
            }
            None => {
                warn!("Spawner {:?} has no item configured; nothing to spawn", entity);
                faults.send(SpawnFault {
                    spawner: entity,
                    reason: SpawnFaultReason::MissingItem,
                });
            }
        }
    }
}

fn begin_respawn_sequences(
    mut commands: Commands,
    mut expired: EventReader<ItemExpired>,
    spawners: Query<(&ItemSpawner, Has<RespawnSequence>)>,
) {
    for event in expired.read() {
        // The spawner may have been despawned since the item was created.
        let Ok((spawner, sequence_running)) = spawners.get(event.spawner) else {
            continue;
        };

        if sequence_running {
            debug!(
                "Spawner {:?} already has a respawn sequence running; ignoring notification",
                event.spawner
            );
            continue;
        }

        commands
            .entity(event.spawner)
            .insert(RespawnSequence::new(spawner.respawn_delay));
    }
}

fn advance_respawn_sequences(
    mut commands: Commands,
    mut spawners: Query<(Entity, &Transform, &ItemSpawner, &mut RespawnSequence)>,
    mut effects: Query<(&mut Transform, &mut Sprite), (With<PopEffect>, Without<ItemSpawner>)>,
    mut faults: EventWriter<SpawnFault>,
    pop_sound: Res<PopSound>,
    time: Res<Time<Virtual>>,
) {
    for (spawner_entity, spawner_transform, spawner, mut sequence) in spawners.iter_mut() {
        sequence.timer.tick(time.delta());

        match sequence.stage {
            RespawnStage::Delay => {
                if !sequence.timer.finished() {
                    continue;
                }

                let Some(effect_spec) = &spawner.effect else {
                    warn!(
                        "Spawner {:?} has no pop effect configured; abandoning respawn",
                        spawner_entity
                    );
                    faults.send(SpawnFault {
                        spawner: spawner_entity,
                        reason: SpawnFaultReason::MissingEffect,
                    });
                    commands.entity(spawner_entity).remove::<RespawnSequence>();
                    continue;
                };

                let from = Vec3::new(
                    spawner_transform.translation.x,
                    spawner_transform.translation.y,
                    1.0,
                );
                let effect = commands
                    .spawn((
                        Sprite {
                            color: effect_spec.color,
                            custom_size: Some(effect_spec.size),
                            ..default()
                        },
                        Transform::from_translation(from),
                        PopEffect,
                        crate::level::LevelEntity,
                    ))
                    .id();

                sequence.stage = RespawnStage::Rise { effect, from };
                sequence.timer = Timer::from_seconds(spawner.rise_time, TimerMode::Once);
            }
            RespawnStage::Rise { effect, from } => {
                // The effect can vanish under us on a level reset.
                let Ok((mut effect_transform, mut effect_sprite)) = effects.get_mut(effect) else {
                    commands.entity(spawner_entity).remove::<RespawnSequence>();
                    continue;
                };

                let target = from + Vec3::Y * spawner.rise_amount;
                effect_transform.translation = from.lerp(target, sequence.timer.fraction());

                if !sequence.timer.finished() {
                    continue;
                }
                effect_transform.translation = target;

                // The pop itself: sound plus the popped look.
                if let Some(sound) = &pop_sound.0 {
                    commands.spawn((AudioPlayer::new(sound.clone()), PlaybackSettings::DESPAWN));
                }
                if let Some(effect_spec) = &spawner.effect {
                    effect_sprite.color = effect_spec.popped_color;
                }

                sequence.stage = RespawnStage::PopHold { effect };
                sequence.timer = Timer::from_seconds(spawner.pop_visible_time, TimerMode::Once);
            }
            RespawnStage::PopHold { effect } => {
                if !sequence.timer.finished() {
                    continue;
                }

                let spawn_position = match effects.get_mut(effect) {
                    Ok((effect_transform, _)) => effect_transform.translation,
                    Err(_) => {
                        Vec3::new(
                            spawner_transform.translation.x,
                            spawner_transform.translation.y + spawner.rise_amount,
                            1.0,
                        )
                    }
                };

                match &spawner.item {
                    Some(spec) => {
                        spawn_item(&mut commands, spec, spawn_position, Some(spawner_entity));
                    }
                    None => {
                        warn!(
                            "Spawner {:?} has no item configured; replacement skipped",
                            spawner_entity
                        );
                        faults.send(SpawnFault {
                            spawner: spawner_entity,
                            reason: SpawnFaultReason::MissingItem,
                        });
                    }
                }

                if let Some(mut effect_commands) = commands.get_entity(effect) {
                    effect_commands.despawn();
                }
                commands.entity(spawner_entity).remove::<RespawnSequence>();
            }
        }
    }
}
