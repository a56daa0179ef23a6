use bevy::prelude::*;

use crate::constants::*;
use crate::throw::ThrowController;

pub struct HudPlugin;

impl Plugin for HudPlugin {
	fn build(&self, app: &mut App) {
		app.add_systems(Update, (spawn_power_bars, update_power_bars));
	}
}

#[derive(Component)]
pub struct PowerBar {
	pub thrower: Entity,
}

#[derive(Component)]
pub(crate) struct PowerBarBackground;

#[derive(Component)]
pub(crate) struct PowerBarForeground;

#[derive(Component)]
pub(crate) struct PowerBarLabel;

#[derive(Component)]
pub struct HasPowerBarUI;

fn spawn_power_bars(
	mut commands: Commands,
	throwers: Query<Entity, (With<ThrowController>, Without<HasPowerBarUI>)>,
) {
	for entity in throwers.iter() {
		commands.entity(entity).insert(HasPowerBarUI);

		// The bar follows its thrower through resets: both carry
		// LevelEntity, so teardown removes the pair together.
		commands.spawn((
			Node {
				position_type: PositionType::Absolute,
				top: Val::Px(UI_MARGIN),
				right: Val::Px(UI_MARGIN),
				width: Val::Px(POWER_BAR_WIDTH),
				height: Val::Px(POWER_BAR_HEIGHT),
				..default()
			},
			BackgroundColor(POWER_BAR_COLOR_BG),
			ZIndex(10),
			PowerBar { thrower: entity },
			PowerBarBackground,
			crate::level::LevelEntity,
		));

		commands.spawn((
			Node {
				position_type: PositionType::Absolute,
				top: Val::Px(UI_MARGIN),
				right: Val::Px(UI_MARGIN),
				width: Val::Px(0.0),
				height: Val::Px(POWER_BAR_HEIGHT),
				..default()
			},
			BackgroundColor(POWER_BAR_COLOR_FG),
			ZIndex(11),
			PowerBar { thrower: entity },
			PowerBarForeground,
			crate::level::LevelEntity,
		));

		commands.spawn((
			Text::new("Throw"),
			Node {
				position_type: PositionType::Absolute,
				top: Val::Px(UI_MARGIN - 2.0),
				right: Val::Px(UI_MARGIN + POWER_BAR_WIDTH + 5.0),
				..default()
			},
			TextColor(Color::WHITE),
			TextFont {
				font_size: UI_FONT_SIZE_SMALL,
				..default()
			},
			ZIndex(12),
			PowerBar { thrower: entity },
			PowerBarLabel,
			crate::level::LevelEntity,
		));
	}
}

fn update_power_bars(
	throwers: Query<&ThrowController>,
	mut bars: Query<(&PowerBar, &mut Node), With<PowerBarForeground>>,
) {
	for (bar, mut node) in bars.iter_mut() {
		let Ok(controller) = throwers.get(bar.thrower) else {
			continue;
		};

		// Empty until a charge starts, then fills with the charge.
		let fill = if controller.is_charging() {
			controller.power()
		} else {
			0.0
		};
		node.width = Val::Px(POWER_BAR_WIDTH * fill);
	}
}
