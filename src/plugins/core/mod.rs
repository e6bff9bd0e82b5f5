//! Core plugin: shared resources, global settings and the round restart.

use bevy::prelude::*;

use crate::common::{state::GameState, tunables::Tunables};

pub fn plugin(app: &mut App) {
    // Keep a customised `Tunables` inserted before the plugins were registered.
    app.init_resource::<Tunables>();
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));
    app.init_resource::<ButtonInput<KeyCode>>();

    app.add_systems(
        Update,
        restart_on_key.run_if(not(in_state(GameState::InGame))),
    );
}

/// `R` or `Enter` after a finished round starts a fresh one.
fn restart_on_key(keys: Res<ButtonInput<KeyCode>>, mut next: ResMut<NextState<GameState>>) {
    if keys.any_just_pressed([KeyCode::KeyR, KeyCode::Enter]) {
        info!("restarting level");
        next.set(GameState::InGame);
    }
}

#[cfg(test)]
mod tests;
