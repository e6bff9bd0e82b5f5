//! Player plugin.
//!
//! Pipeline:
//! - Update: sample the keyboard into the `PlayerCommands` resource
//! - FixedUpdate (`BodySystems::Drive`): commands become machine events, then `update`
//! - FixedPostUpdate: enemy contacts queue a hit for the next step
//! - Update: `PlayerExited` / last life lost drive `GameState`
//!
//! Movement follows arcade rules: the machine sets horizontal acceleration and jump
//! velocity; `Body::integrate` applies drag and speed limits; Avian adds gravity.

pub mod actor;
pub mod stats;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::ecs::error::BevyError;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

pub use actor::{DoorSpan, Knock, PLAYER_SIZE, Player, PlayerContext, PlayerEvent, PlayerState};
pub use stats::PlayerStats;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};
use crate::fsm::{ActorPlugin, FsmResult, StateMachine, attach};
use crate::plugins::head;
use crate::plugins::physics::{BodySense, BodySystems};
use crate::plugins::world::door::Door;
use crate::plugins::world::{KILL_PLANE_Y, SPAWN_POINT};

/// Latest sampled input, consumed by the fixed-step driver.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct PlayerCommands {
    /// `-1.0`, `0.0` or `1.0`.
    pub move_x: f32,
    pub jump: bool,
    pub puke: bool,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerExited {
    pub entity: Entity,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDied {
    pub entity: Entity,
    pub lives_left: u32,
}

pub fn plugin(app: &mut App) {
    app.add_plugins(ActorPlugin::<Player>::default())
        // Present without `InputPlugin` so headless apps can press keys.
        .init_resource::<ButtonInput<KeyCode>>()
        .init_resource::<PlayerCommands>()
        .add_message::<PlayerExited>()
        .add_message::<PlayerDied>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(
            Update,
            (gather_input, sync_player_sprite, advance_game_flow)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            drive_player
                .in_set(BodySystems::Drive)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            player_contacts
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        );
}

/// A player at `spawn_point` with its machine in `Normal`.
pub fn new_player(
    tunables: &Tunables,
    spawn_point: Vec2,
) -> FsmResult<(Player, StateMachine<Player>)> {
    attach(
        Player::new(tunables, spawn_point),
        StateMachine::from_registry(actor::player_states()),
        PlayerState::Normal,
    )
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) -> Result<(), BevyError> {
    let (mut player, machine) = new_player(&tunables, SPAWN_POINT)?;

    let entity = commands.spawn_empty().id();
    let (_, puker) = head::spawn_head(&mut commands, entity, &tunables)?;
    player.puker = Some(puker);

    let layers = CollisionLayers::new(Layer::Player, [Layer::World, Layer::Enemy, Layer::Door]);

    commands.entity(entity).insert((
        Name::new("Player"),
        player,
        machine,
        Sprite {
            color: Color::srgb(0.85, 0.7, 0.45),
            custom_size: Some(PLAYER_SIZE),
            ..default()
        },
        Transform::from_translation(SPAWN_POINT.extend(1.0)),
        (
            RigidBody::Dynamic,
            Collider::rectangle(PLAYER_SIZE.x, PLAYER_SIZE.y),
            LockedAxes::ROTATION_LOCKED,
            layers,
            LinearVelocity::ZERO,
            Friction::ZERO,
            CollisionEventsEnabled,
            BodySense::default(),
        ),
        DespawnOnExit(GameState::InGame),
    ));
    Ok(())
}

fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerCommands>) {
    let left = keys.any_pressed([KeyCode::ArrowLeft, KeyCode::KeyA]);
    let right = keys.any_pressed([KeyCode::ArrowRight, KeyCode::KeyD]);

    input.move_x = match (left, right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    input.jump = keys.any_pressed([KeyCode::ArrowUp, KeyCode::KeyW, KeyCode::Space]);
    input.puke = keys.any_pressed([KeyCode::KeyX, KeyCode::KeyJ]);
}

pub(crate) fn drive_player(
    time: Res<Time>,
    input: Res<PlayerCommands>,
    q_door: Query<&Transform, (With<Door>, Without<Player>)>,
    mut q: Query<(
        Entity,
        &mut Player,
        &mut StateMachine<Player>,
        &mut Transform,
        &mut LinearVelocity,
        &BodySense,
    )>,
    mut exited: MessageWriter<PlayerExited>,
    mut died: MessageWriter<PlayerDied>,
) -> Result<(), BevyError> {
    let dt = time.delta_secs();
    let ctx = PlayerContext {
        door: q_door.iter().next().map(|tf| Door::span(tf.translation.truncate())),
    };

    for (entity, mut player, mut machine, mut tf, mut vel, sense) in &mut q {
        let p = &mut *player;
        let m = &mut *machine;

        p.advance(dt);
        p.stats.tick_stomach(time.delta());
        p.body.load(&tf, &vel, sense);

        if p.pending_hit.is_some() {
            p.take_damage(m, &ctx)?;
        }

        if input.jump {
            p.jump(m, &ctx)?;
        } else {
            p.end_jump(m, &ctx)?;
        }
        if input.move_x < 0.0 {
            p.move_left(m, &ctx)?;
        } else if input.move_x > 0.0 {
            p.move_right(m, &ctx)?;
        } else {
            p.stop_moving(m, &ctx)?;
        }

        m.update(p, &ctx)?;
        p.body.integrate(dt);
        p.body.store(&mut vel);

        if p.take_exited() {
            info!("player {entity:?} left the level");
            exited.write(PlayerExited { entity });
        }

        let fell = p.body.position.y < KILL_PLANE_Y;
        if !p.stats.is_out_of_lives() && (fell || p.stats.health == 0) {
            let lives_left = p.stats.remove_life(1);
            info!("player {entity:?} lost a life, {lives_left} left");
            died.write(PlayerDied { entity, lives_left });

            if lives_left > 0 {
                p.respawn();
                tf.translation = p.spawn_point.extend(tf.translation.z);
                vel.0 = Vec2::ZERO;
            }
        }
    }
    Ok(())
}

/// Touching a live enemy queues a hit. The machine decides whether it lands.
pub(crate) fn player_contacts(
    mut started: MessageReader<CollisionStart>,
    q_layers: Query<&CollisionLayers>,
    q_tf: Query<&Transform>,
    mut q_player: Query<&mut Player>,
) {
    for ev in started.read() {
        let sides = [
            (ev.collider1, ev.collider2, ev.body2.unwrap_or(ev.collider2)),
            (ev.collider2, ev.collider1, ev.body1.unwrap_or(ev.collider1)),
        ];
        for (player_e, other_collider, other_body) in sides {
            let Ok(mut player) = q_player.get_mut(player_e) else {
                continue;
            };
            let Ok(layers) = q_layers.get(other_collider) else {
                continue;
            };
            if !layers.memberships.has_all(Layer::Enemy) {
                continue;
            }

            let from_x = q_tf
                .get(other_body)
                .map_or(player.body.position.x, |tf| tf.translation.x);
            player.pending_hit = Some(Knock { amount: 1, from_x });
        }
    }
}

fn sync_player_sprite(mut q: Query<(&Player, &mut Sprite)>) {
    for (player, mut sprite) in &mut q {
        let flip = player.facing < 0.0;
        if sprite.flip_x != flip {
            sprite.flip_x = flip;
        }
    }
}

fn advance_game_flow(
    mut exited: MessageReader<PlayerExited>,
    mut died: MessageReader<PlayerDied>,
    mut next: ResMut<NextState<GameState>>,
) {
    let exited = exited.read().count() > 0;
    let out_of_lives = died.read().fold(false, |acc, d| acc || d.lives_left == 0);

    if exited {
        info!("level complete");
        next.set(GameState::LevelComplete);
    } else if out_of_lives {
        info!("game over");
        next.set(GameState::GameOver);
    }
}

#[cfg(test)]
mod tests;
