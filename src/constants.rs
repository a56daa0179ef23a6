use bevy::prelude::*;

// ============ Physics Constants ============

pub const GRAVITY: f32 = -980.0;
pub const GROUND_SNAP_DISTANCE: f32 = 10.0;

// ============ Player Constants ============

pub const PLAYER_DEFAULT_SPEED: f32 = 200.0;
pub const PLAYER_DEFAULT_JUMP_FORCE: f32 = 400.0;
pub const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 56.0);
pub const PLAYER_COLOR: Color = Color::srgb(0.3, 0.7, 0.3);

// ============ Item Constants ============

pub const ITEM_DEFAULT_LIFETIME: f32 = 5.0;
pub const ITEM_SIZE: Vec2 = Vec2::new(24.0, 24.0);

// ============ Spawner Constants ============

pub const RESPAWN_DEFAULT_DELAY: f32 = 2.0;
pub const RISE_DEFAULT_AMOUNT: f32 = 60.0;
pub const RISE_DEFAULT_TIME: f32 = 1.0;
pub const POP_DEFAULT_VISIBLE_TIME: f32 = 0.5;
pub const EFFECT_SIZE: Vec2 = Vec2::new(28.0, 28.0);

// ============ Throw Constants ============

pub const THROW_DEFAULT_MAX_HOLD_TIME: f32 = 2.0;
pub const THROW_DEFAULT_MAX_FORCE: f32 = 700.0;
pub const THROW_DEFAULT_ANGLE_DEGREES: f32 = 45.0;
pub const THROW_HOLD_OFFSET: Vec2 = Vec2::new(30.0, 10.0);

// ============ Bubble Constants ============

pub const BUBBLE_SIZE: Vec2 = Vec2::new(48.0, 48.0);
pub const BUBBLE_DEFAULT_VISIBLE_TIME: f32 = 0.5;
pub const BUBBLE_DEFAULT_GROWTH_TIME: f32 = 1.2;
pub const BUBBLE_DEFAULT_START_SCALE: f32 = 0.2;
pub const NPC_SIZE: Vec2 = Vec2::new(36.0, 48.0);
pub const NPC_COLOR: Color = Color::srgb(0.6, 0.6, 0.6);
pub const NPC_CHEERED_COLOR: Color = Color::srgb(0.95, 0.85, 0.3);

// ============ UI Constants ============

pub const UI_MARGIN: f32 = 10.0;
pub const UI_FONT_SIZE_SMALL: f32 = 16.0;

pub const POWER_BAR_WIDTH: f32 = 200.0;
pub const POWER_BAR_HEIGHT: f32 = 16.0;
pub const POWER_BAR_COLOR_BG: Color = Color::srgb(0.2, 0.2, 0.2);
pub const POWER_BAR_COLOR_FG: Color = Color::srgb(0.9, 0.6, 0.2);

pub const PLATFORM_COLOR: Color = Color::srgb(0.3, 0.3, 0.3);
