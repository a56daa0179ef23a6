use bevy::prelude::*;

use crate::item::Item;
use crate::physics::aabb_overlap;
use crate::throw::Held;

pub struct BubblePlugin;

impl Plugin for BubblePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (pop_bubbles, advance_bubble_regrowth).chain());
    }
}

/// Thought bubble a thrown item can pop. Pops once; the replacement grows in
/// on its own schedule and is itself poppable.
#[derive(Component)]
pub struct ThoughtBubble {
    pub color: Color,
    pub popped_color: Color,
    pub npc: Option<Entity>,
    pub npc_cheered_color: Color,
    pub regrowth: Option<RegrowthSpec>,
    popped: bool,
}

impl ThoughtBubble {
    pub fn new(color: Color, popped_color: Color) -> Self {
        Self {
            color,
            popped_color,
            npc: None,
            npc_cheered_color: crate::constants::NPC_CHEERED_COLOR,
            regrowth: None,
            popped: false,
        }
    }

    pub fn is_popped(&self) -> bool {
        self.popped
    }
}

#[derive(Clone)]
pub struct RegrowthSpec {
    pub popped_visible_time: f32,
    pub growth_time: f32,
    pub start_scale: f32,
    pub final_scale: f32,
    pub size: Vec2,
}

#[derive(Component)]
pub struct Npc;

// Runs on the popped bubble until the replacement is fully grown.
#[derive(Component)]
pub struct BubbleRegrowth {
    stage: RegrowthStage,
    timer: Timer,
    spec: RegrowthSpec,
}

#[derive(Clone, Copy)]
enum RegrowthStage {
    /// Popped look stays on screen before the old bubble is hidden.
    PoppedHold,
    /// Replacement bubble scales up from its start scale.
    Growing { replacement: Entity },
}

pub fn spawn_bubble_site(
    commands: &mut Commands,
    tuning: &crate::config::Tuning,
    position: Vec2,
    npc_position: Option<Vec2>,
) {
    let npc = npc_position.map(|pos| {
        commands
            .spawn((
                Sprite {
                    color: crate::constants::NPC_COLOR,
                    custom_size: Some(crate::constants::NPC_SIZE),
                    ..default()
                },
                Transform::from_xyz(pos.x, pos.y, 0.5),
                Npc,
                crate::level::LevelEntity,
            ))
            .id()
    });

    let bubble = &tuning.bubble;
    commands.spawn((
        Sprite {
            color: Color::srgb(bubble.color.0, bubble.color.1, bubble.color.2),
            custom_size: Some(Vec2::new(bubble.size.0, bubble.size.1)),
            ..default()
        },
        Transform::from_xyz(position.x, position.y, 0.5),
        ThoughtBubble {
            color: Color::srgb(bubble.color.0, bubble.color.1, bubble.color.2),
            popped_color: Color::srgb(
                bubble.popped_color.0,
                bubble.popped_color.1,
                bubble.popped_color.2,
            ),
            npc,
            npc_cheered_color: Color::srgb(
                bubble.npc_cheered_color.0,
                bubble.npc_cheered_color.1,
                bubble.npc_cheered_color.2,
            ),
            regrowth: Some(RegrowthSpec {
                popped_visible_time: bubble.popped_visible_time,
                growth_time: bubble.growth_time,
                start_scale: bubble.start_scale,
                final_scale: bubble.final_scale,
                size: Vec2::new(bubble.size.0, bubble.size.1),
            }),
            popped: false,
        },
        crate::level::LevelEntity,
    ));
}

fn pop_bubbles(
    mut commands: Commands,
    mut bubbles: Query<(Entity, &Transform, &mut Sprite, &mut ThoughtBubble), Without<Item>>,
    items: Query<(&Transform, &Sprite), (With<Item>, Without<Held>, Without<ThoughtBubble>)>,
) {
    for (bubble_entity, bubble_transform, mut bubble_sprite, mut bubble) in bubbles.iter_mut() {
        if bubble.popped {
            continue;
        }

        // Scale matters here: a replacement can be popped mid-growth.
        let bubble_size =
            bubble_sprite.custom_size.unwrap_or(Vec2::ONE) * bubble_transform.scale.truncate();
        let hit = items.iter().any(|(item_transform, item_sprite)| {
            aabb_overlap(
                bubble_transform.translation,
                bubble_size,
                item_transform.translation,
                item_sprite.custom_size.unwrap_or(Vec2::ONE),
            )
        });
        if !hit {
            continue;
        }

        bubble.popped = true;
        bubble_sprite.color = bubble.popped_color;

        if let Some(spec) = bubble.regrowth.clone() {
            commands.entity(bubble_entity).insert(BubbleRegrowth {
                stage: RegrowthStage::PoppedHold,
                timer: Timer::from_seconds(spec.popped_visible_time, TimerMode::Once),
                spec,
            });
        }
    }
}

fn advance_bubble_regrowth(
    mut commands: Commands,
    mut popped: Query<(
        Entity,
        &Transform,
        &ThoughtBubble,
        &mut BubbleRegrowth,
        &mut Visibility,
    )>,
    mut replacements: Query<&mut Transform, (With<ThoughtBubble>, Without<BubbleRegrowth>)>,
    mut npc_sprites: Query<&mut Sprite, (With<Npc>, Without<ThoughtBubble>)>,
    time: Res<Time<Virtual>>,
) {
    for (bubble_entity, bubble_transform, bubble, mut sequence, mut visibility) in popped.iter_mut()
    {
        sequence.timer.tick(time.delta());
        let spec = sequence.spec.clone();

        match sequence.stage {
            RegrowthStage::PoppedHold => {
                if !sequence.timer.finished() {
                    continue;
                }

                *visibility = Visibility::Hidden;

                let replacement = commands
                    .spawn((
                        Sprite {
                            color: bubble.color,
                            custom_size: Some(spec.size),
                            ..default()
                        },
                        Transform::from_translation(bubble_transform.translation)
                            .with_scale(Vec3::splat(spec.start_scale)),
                        ThoughtBubble {
                            color: bubble.color,
                            popped_color: bubble.popped_color,
                            npc: bubble.npc,
                            npc_cheered_color: bubble.npc_cheered_color,
                            regrowth: Some(spec.clone()),
                            popped: false,
                        },
                        crate::level::LevelEntity,
                    ))
                    .id();

                sequence.stage = RegrowthStage::Growing { replacement };
                sequence.timer = Timer::from_seconds(spec.growth_time, TimerMode::Once);
            }
            RegrowthStage::Growing { replacement } => {
                // The replacement can vanish on a level reset, or start its
                // own regrowth if something pops it mid-growth.
                let Ok(mut replacement_transform) = replacements.get_mut(replacement) else {
                    commands.entity(bubble_entity).despawn();
                    continue;
                };

                let scale = spec.start_scale
                    + (spec.final_scale - spec.start_scale) * sequence.timer.fraction();
                replacement_transform.scale = Vec3::splat(scale);

                if !sequence.timer.finished() {
                    continue;
                }
                replacement_transform.scale = Vec3::splat(spec.final_scale);

                if let Some(npc) = bubble.npc {
                    if let Ok(mut npc_sprite) = npc_sprites.get_mut(npc) {
                        npc_sprite.color = bubble.npc_cheered_color;
                    }
                }

                commands.entity(bubble_entity).despawn();
            }
        }
    }
}
