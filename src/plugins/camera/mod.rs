//! Camera plugin (render-only).
//!
//! A system cannot have `Query<&Transform>` and `Query<&mut Transform>` at the same time
//! unless Bevy can prove the queries are disjoint, so the follow system encodes that with
//! `Without<...>` filters.
//!
//! ```text
//! OnEnter(InGame): spawn MainCamera
//! PostUpdate:      follow_player (before transform propagation)
//! ```

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::player::Player;
use crate::plugins::world::{LEVEL_LEFT, LEVEL_RIGHT, SPAWN_POINT};

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
    /// Half the visible width, used to keep the view inside the level.
    pub half_width: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_camera)
        .add_systems(
            PostUpdate,
            follow_player
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera {
            responsiveness: 5.0,
            half_width: 640.0,
        },
        FireflyConfig::default(),
        Transform::from_translation(SPAWN_POINT.extend(999.0)),
        DespawnOnExit(GameState::InGame),
    ));
}

/// Clamp a camera x so the view stays between the level walls.
pub fn clamp_to_level(x: f32, half_width: f32) -> f32 {
    let lo = LEVEL_LEFT + half_width;
    let hi = LEVEL_RIGHT - half_width;
    if lo > hi { (LEVEL_LEFT + LEVEL_RIGHT) * 0.5 } else { x.clamp(lo, hi) }
}

fn follow_player(
    time: Res<Time>,
    q_player: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Player>>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok((mut tf_cam, cam)) = q_cam.single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    let alpha = 1.0 - (-cam.responsiveness * dt).exp();

    let target = Vec2::new(
        clamp_to_level(tf_player.translation.x, cam.half_width),
        tf_player.translation.y,
    );
    let current = tf_cam.translation.truncate();
    let next = current + (target - current) * alpha;
    tf_cam.translation.x = next.x;
    tf_cam.translation.y = next.y;
}
