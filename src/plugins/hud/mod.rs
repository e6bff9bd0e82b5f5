//! HUD plugin (render-only): countdown and player stats as a text line.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::player::Player;
use crate::plugins::timer::PoopTimer;

#[derive(Component)]
pub struct HudText;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_hud)
        .add_systems(Update, refresh_hud.run_if(in_state(GameState::InGame)));
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("Hud"),
        HudText,
        Text::new(""),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        DespawnOnExit(GameState::InGame),
    ));
}

pub fn hud_line(timer: &PoopTimer, player: Option<&Player>) -> String {
    match player {
        Some(p) => format!(
            "{}   lives {}/{}   health {}/{}   fullness {}/{}",
            timer.text(),
            p.stats.lives,
            p.stats.max_lives,
            p.stats.health,
            p.stats.max_health,
            p.stats.fullness,
            p.stats.max_fullness,
        ),
        None => timer.text(),
    }
}

fn refresh_hud(
    timer: Res<PoopTimer>,
    q_player: Query<&Player>,
    mut q_text: Query<&mut Text, With<HudText>>,
) {
    let line = hud_line(&timer, q_player.iter().next());
    for mut text in &mut q_text {
        if text.0 != line {
            text.0.clone_from(&line);
        }
    }
}
