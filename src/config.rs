use bevy::{
	asset::{AssetLoader, LoadState},
	prelude::*,
};
use serde::Deserialize;

use crate::constants::*;
use crate::spawner::PopSound;

const TUNING_PATH: &str = "game.tuning.ron";
const POP_SOUND_PATH: &str = "sounds/pop.ogg";

/// Asset-backed tuning: loads `assets/game.tuning.ron`, validates it, and
/// installs it as a resource. Gameplay systems never touch the asset machinery;
/// they wait for `Res<Tuning>` to appear.
pub struct TuningAssetPlugin;

impl Plugin for TuningAssetPlugin {
	fn build(&self, app: &mut App) {
		app.init_asset::<Tuning>()
			.init_asset_loader::<TuningLoader>()
			.add_systems(Startup, load_tuning)
			.add_systems(Update, install_tuning);
	}
}

// Tuning doubles as the asset payload and the installed resource; the
// validated copy is what gets inserted into the world.
#[derive(Asset, TypePath, Resource, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Tuning {
	pub player: PlayerTuning,
	pub item: ItemTuning,
	pub respawn: RespawnTuning,
	pub throw: ThrowTuning,
	pub bubble: BubbleTuning,
	pub level: LevelTuning,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct PlayerTuning {
	pub move_speed: f32,
	pub jump_force: f32,
}

impl Default for PlayerTuning {
	fn default() -> Self {
		Self {
			move_speed: PLAYER_DEFAULT_SPEED,
			jump_force: PLAYER_DEFAULT_JUMP_FORCE,
		}
	}
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ItemTuning {
	pub lifetime: f32,
	// Arms every item's countdown immediately, without waiting for a throw.
	pub debug_auto_arm: bool,
	pub size: (f32, f32),
	pub color: (f32, f32, f32),
}

impl Default for ItemTuning {
	fn default() -> Self {
		Self {
			lifetime: ITEM_DEFAULT_LIFETIME,
			debug_auto_arm: false,
			size: (ITEM_SIZE.x, ITEM_SIZE.y),
			color: (0.9, 0.3, 0.3),
		}
	}
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct RespawnTuning {
	pub respawn_delay: f32,
	pub rise_amount: f32,
	pub rise_time: f32,
	pub pop_visible_time: f32,
	pub effect_size: (f32, f32),
	pub effect_color: (f32, f32, f32),
	pub effect_popped_color: (f32, f32, f32),
}

impl Default for RespawnTuning {
	fn default() -> Self {
		Self {
			respawn_delay: RESPAWN_DEFAULT_DELAY,
			rise_amount: RISE_DEFAULT_AMOUNT,
			rise_time: RISE_DEFAULT_TIME,
			pop_visible_time: POP_DEFAULT_VISIBLE_TIME,
			effect_size: (EFFECT_SIZE.x, EFFECT_SIZE.y),
			effect_color: (0.5, 0.9, 0.5),
			effect_popped_color: (0.95, 0.4, 0.6),
		}
	}
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ThrowTuning {
	pub max_hold_time: f32,
	pub max_throw_force: f32,
	pub throw_angle_degrees: f32,
	pub hold_offset: (f32, f32),
}

impl Default for ThrowTuning {
	fn default() -> Self {
		Self {
			max_hold_time: THROW_DEFAULT_MAX_HOLD_TIME,
			max_throw_force: THROW_DEFAULT_MAX_FORCE,
			throw_angle_degrees: THROW_DEFAULT_ANGLE_DEGREES,
			hold_offset: (THROW_HOLD_OFFSET.x, THROW_HOLD_OFFSET.y),
		}
	}
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct BubbleTuning {
	pub popped_visible_time: f32,
	pub growth_time: f32,
	pub start_scale: f32,
	pub final_scale: f32,
	pub size: (f32, f32),
	pub color: (f32, f32, f32),
	pub popped_color: (f32, f32, f32),
	pub npc_cheered_color: (f32, f32, f32),
}

impl Default for BubbleTuning {
	fn default() -> Self {
		Self {
			popped_visible_time: BUBBLE_DEFAULT_VISIBLE_TIME,
			growth_time: BUBBLE_DEFAULT_GROWTH_TIME,
			start_scale: BUBBLE_DEFAULT_START_SCALE,
			final_scale: 1.0,
			size: (BUBBLE_SIZE.x, BUBBLE_SIZE.y),
			color: (0.85, 0.85, 0.95),
			popped_color: (0.6, 0.5, 0.7),
			npc_cheered_color: (0.95, 0.85, 0.3),
		}
	}
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct PlatformTuning {
	pub position: (f32, f32),
	pub size: (f32, f32),
}

impl Default for PlatformTuning {
	fn default() -> Self {
		Self {
			position: (0.0, -250.0),
			size: (1400.0, 60.0),
		}
	}
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct BubbleSiteTuning {
	pub position: (f32, f32),
	pub npc_position: Option<(f32, f32)>,
}

impl Default for BubbleSiteTuning {
	fn default() -> Self {
		Self {
			position: (250.0, -120.0),
			npc_position: Some((250.0, -190.0)),
		}
	}
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct LevelTuning {
	pub player_spawn: (f32, f32),
	pub platforms: Vec<PlatformTuning>,
	pub spawners: Vec<(f32, f32)>,
	pub bubbles: Vec<BubbleSiteTuning>,
	pub reset_zone_position: (f32, f32),
	pub reset_zone_size: (f32, f32),
}

impl Default for LevelTuning {
	fn default() -> Self {
		Self {
			player_spawn: (-400.0, -150.0),
			platforms: vec![
				PlatformTuning::default(),
				PlatformTuning {
					position: (350.0, -60.0),
					size: (240.0, 30.0),
				},
			],
			spawners: vec![(-100.0, -200.0)],
			bubbles: vec![BubbleSiteTuning::default()],
			reset_zone_position: (0.0, -500.0),
			reset_zone_size: (4000.0, 100.0),
		}
	}
}

#[derive(Default)]
struct TuningLoader;

impl AssetLoader for TuningLoader {
	type Asset = Tuning;
	type Settings = ();
	type Error = std::io::Error;

	async fn load(
		&self,
		reader: &mut dyn bevy::asset::io::Reader,
		_settings: &Self::Settings,
		_load_context: &mut bevy::asset::LoadContext<'_>,
	) -> Result<Self::Asset, Self::Error> {
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes).await?;
		let data = ron::de::from_bytes::<Tuning>(&bytes)
			.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
		Ok(data)
	}

	fn extensions(&self) -> &[&str] {
		&["tuning.ron"]
	}
}

#[derive(Resource)]
struct TuningHandle(Handle<Tuning>);

fn load_tuning(mut commands: Commands, asset_server: Res<AssetServer>) {
	commands.insert_resource(TuningHandle(asset_server.load(TUNING_PATH)));
	commands.insert_resource(PopSound(Some(asset_server.load(POP_SOUND_PATH))));
}

fn install_tuning(
	mut commands: Commands,
	asset_server: Res<AssetServer>,
	handle: Option<Res<TuningHandle>>,
	tuning_assets: Res<Assets<Tuning>>,
	installed: Option<Res<Tuning>>,
) {
	// Only install once
	if installed.is_some() {
		return;
	}

	let Some(handle) = handle else { return };

	if let LoadState::Failed(_) = asset_server.load_state(&handle.0) {
		warn!("Failed to load {}; using default tuning", TUNING_PATH);
		commands.insert_resource(Tuning::default());
		return;
	}

	let Some(data) = tuning_assets.get(&handle.0) else {
		return;
	};

	let errors = validate_tuning(data);
	if !errors.is_empty() {
		error!(
			"Tuning validation failed with {} error(s); using default tuning:",
			errors.len()
		);
		for (i, err) in errors.iter().enumerate() {
			error!("  {}. {}", i + 1, err);
		}
		commands.insert_resource(Tuning::default());
		return;
	}

	info!("Tuning loaded from {}", TUNING_PATH);
	commands.insert_resource(data.clone());
}

fn validate_tuning(tuning: &Tuning) -> Vec<String> {
	let mut errors = Vec::new();

	if tuning.item.lifetime <= 0.0 {
		errors.push(format!(
			"item.lifetime must be positive, got {}",
			tuning.item.lifetime
		));
	}

	if tuning.throw.max_hold_time <= 0.0 {
		errors.push(format!(
			"throw.max_hold_time must be positive, got {}",
			tuning.throw.max_hold_time
		));
	}

	if tuning.throw.max_throw_force < 0.0 {
		errors.push(format!(
			"throw.max_throw_force must not be negative, got {}",
			tuning.throw.max_throw_force
		));
	}

	if tuning.respawn.respawn_delay < 0.0 {
		errors.push(format!(
			"respawn.respawn_delay must not be negative, got {}",
			tuning.respawn.respawn_delay
		));
	}

	if tuning.respawn.rise_time <= 0.0 {
		errors.push(format!(
			"respawn.rise_time must be positive, got {}",
			tuning.respawn.rise_time
		));
	}

	if tuning.respawn.pop_visible_time < 0.0 {
		errors.push(format!(
			"respawn.pop_visible_time must not be negative, got {}",
			tuning.respawn.pop_visible_time
		));
	}

	if tuning.bubble.growth_time <= 0.0 {
		errors.push(format!(
			"bubble.growth_time must be positive, got {}",
			tuning.bubble.growth_time
		));
	}

	if tuning.bubble.popped_visible_time < 0.0 {
		errors.push(format!(
			"bubble.popped_visible_time must not be negative, got {}",
			tuning.bubble.popped_visible_time
		));
	}

	if tuning.bubble.start_scale <= 0.0 || tuning.bubble.final_scale <= 0.0 {
		errors.push(format!(
			"bubble scales must be positive, got start {} and final {}",
			tuning.bubble.start_scale, tuning.bubble.final_scale
		));
	}

	if tuning.player.move_speed <= 0.0 {
		errors.push(format!(
			"player.move_speed must be positive, got {}",
			tuning.player.move_speed
		));
	}

	errors
}
