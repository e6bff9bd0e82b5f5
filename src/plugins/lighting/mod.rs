//! Lighting plugin (Firefly) (render-only).
//!
//! A light follows the player; the exit door carries its own light whose colour tracks the
//! door's mode through `StateChanged<Door>`.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::fsm::{StateChanged, publish_state_changes};
use crate::plugins::player::Player;
use crate::plugins::world::door::{DOOR_POSITION, Door, DoorState};

#[derive(Component)]
pub struct PlayerLight;

#[derive(Component)]
pub struct DoorLight;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), setup)
        .add_systems(
            Update,
            follow_player_light.run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            PostUpdate,
            tint_door_light
                .after(publish_state_changes::<Door>)
                .run_if(in_state(GameState::InGame)),
        );
}

pub fn door_light_color(state: DoorState) -> Color {
    match state {
        DoorState::Closed => Color::srgb(0.55, 0.7, 1.0),
        DoorState::Opened => Color::srgb(1.0, 0.95, 0.7),
        DoorState::Ruined => Color::srgb(0.55, 0.75, 0.2),
    }
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: Color::srgb(1.0, 0.9, 0.75),
            radius: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(GameState::InGame),
    ));

    commands.spawn((
        Name::new("DoorLight"),
        DoorLight,
        PointLight2d {
            color: door_light_color(DoorState::Closed),
            radius: 220.0,
            ..default()
        },
        Transform::from_translation(DOOR_POSITION.extend(10.0)),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_player_light(
    q_player: Query<&Transform, (With<Player>, Without<PlayerLight>)>,
    mut q_light: Query<&mut Transform, (With<PlayerLight>, Without<Player>)>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok(mut tf_light) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_player.translation.x;
    tf_light.translation.y = tf_player.translation.y;
}

fn tint_door_light(
    mut changes: MessageReader<StateChanged<Door>>,
    mut q_light: Query<&mut PointLight2d, With<DoorLight>>,
) {
    let Some(last) = changes.read().last() else {
        return;
    };
    for mut light in &mut q_light {
        light.color = door_light_color(last.to);
    }
}
