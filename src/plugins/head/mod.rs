//! Player head actor: the puke attack.
//!
//! ```text
//!   Smiling  enter: stop, rest frame 0
//!            StartPuking [at rest frame] -> Puking            else Rejected
//!   Puking   enter: play the puke clip once
//!            Update: clip finished -> Smiling; past frame 5 -> request a shot
//!            StopPuking [clip finished] -> Smiling            else Rejected
//! ```
//!
//! Shots go through the head's puke weapon, so the cooldown gate decides how many actually
//! leave. Each shot that does leave costs the player one unit of fullness.

use bevy::ecs::error::BevyError;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{state::GameState, tunables::Tunables};
use crate::fsm::{
    Actor, ActorPlugin, FsmResult, Outcome, StateDef, StateMachine, StateRegistry, attach,
};
use crate::plugins::animation::{Animator, Clip};
use crate::plugins::physics::BodySystems;
use crate::plugins::player::{self, Player, PlayerCommands, PlayerState};
use crate::plugins::projectiles::allocator::fire_weapons;
use crate::plugins::projectiles::messages::{FireRequest, ProjectileFired};
use crate::plugins::projectiles::weapon::spawn_puker;

/// Head position relative to the player's centre.
pub const HEAD_OFFSET: Vec2 = Vec2::new(2.0, 20.0);
/// Mouth position relative to the head, facing right.
pub const PUKER_OFFSET: Vec2 = Vec2::new(12.0, -2.0);

/// Mouth opens, holds, closes again.
pub static PUKE: Clip = Clip {
    name: "puke",
    frames: &[
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 13, 12, 11, 10, 9,
        8, 7, 6, 5, 4, 3, 2, 1,
    ],
    fps: 60.0,
    looping: false,
};

/// Sheet frames after this one spray.
const SPRAY_AFTER_FRAME: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadState {
    Smiling,
    Puking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadEvent {
    Update,
    StartPuking,
    StopPuking,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerPuked {
    pub player: Entity,
    pub fullness: u32,
}

#[derive(Component, Debug, Clone)]
pub struct Head {
    pub animator: Animator,
    pub puker: Entity,
    shot_requested: bool,
}

impl Actor for Head {
    type State = HeadState;
    type Event = HeadEvent;
    type Context = ();

    const UPDATE: HeadEvent = HeadEvent::Update;
    const NAME: &'static str = "head";
}

impl Head {
    pub fn new(puker: Entity) -> Self {
        Self {
            animator: Animator::default(),
            puker,
            shot_requested: false,
        }
    }

    /// Start the puke attack. `Handled` only if it actually started.
    pub fn use_puker(&mut self, m: &mut StateMachine<Self>) -> FsmResult<Outcome> {
        m.handle(self, HeadEvent::StartPuking, &())
    }

    pub fn smile(&mut self, m: &mut StateMachine<Self>) -> FsmResult<Outcome> {
        m.handle(self, HeadEvent::StopPuking, &())
    }

    pub fn take_shot_request(&mut self) -> bool {
        std::mem::take(&mut self.shot_requested)
    }
}

pub fn head_states() -> StateRegistry<Head> {
    StateRegistry::new()
        .state(
            HeadState::Smiling,
            StateDef::new()
                .on_enter(enter_smiling)
                .on(HeadEvent::StartPuking, start_puking),
        )
        .state(
            HeadState::Puking,
            StateDef::new()
                .on_enter(enter_puking)
                .on(HeadEvent::Update, update_puking)
                .on(HeadEvent::StopPuking, stop_puking),
        )
}

fn enter_smiling(head: &mut Head, _: Option<HeadState>) {
    head.animator.set_frame(0);
}

fn enter_puking(head: &mut Head, _: Option<HeadState>) {
    head.animator.restart(&PUKE);
}

fn start_puking(head: &mut Head, m: &mut StateMachine<Head>, _: &()) -> FsmResult<Outcome> {
    if head.animator.frame() != 0 {
        return Ok(Outcome::Rejected);
    }
    m.set_state(head, HeadState::Puking)?;
    Ok(Outcome::Handled)
}

fn update_puking(head: &mut Head, m: &mut StateMachine<Head>, _: &()) -> FsmResult<Outcome> {
    if !head.animator.is_current(&PUKE) {
        return Ok(Outcome::Handled);
    }
    if head.animator.is_finished() {
        m.set_state(head, HeadState::Smiling)?;
    } else if head.animator.frame() > SPRAY_AFTER_FRAME {
        head.shot_requested = true;
    }
    Ok(Outcome::Handled)
}

fn stop_puking(head: &mut Head, m: &mut StateMachine<Head>, _: &()) -> FsmResult<Outcome> {
    if !head.animator.is_finished() {
        return Ok(Outcome::Rejected);
    }
    m.set_state(head, HeadState::Smiling)?;
    Ok(Outcome::Handled)
}

/// Horizontal speed offset in `[-75, 75)`, varied along the clip.
#[inline]
pub fn puke_spread(clip_index: usize) -> f32 {
    ((clip_index * 37) % 150) as f32 - 75.0
}

pub fn plugin(app: &mut App) {
    app.add_plugins(ActorPlugin::<Head>::default())
        .add_message::<PlayerPuked>()
        .add_systems(
            FixedUpdate,
            (
                drive_heads
                    .in_set(BodySystems::Drive)
                    .after(player::drive_player),
                consume_fullness
                    .in_set(BodySystems::Emit)
                    .after(fire_weapons),
            )
                .run_if(in_state(GameState::InGame)),
        );
}

/// Spawn the head (with its puke weapon) as a child of `player`.
/// Returns `(head, puker)`.
pub fn spawn_head(
    commands: &mut Commands,
    player: Entity,
    tunables: &Tunables,
) -> FsmResult<(Entity, Entity)> {
    let entity = commands.spawn_empty().id();
    let puker = spawn_puker(commands, entity, PUKER_OFFSET, tunables);
    let (head, machine) = attach(
        Head::new(puker),
        StateMachine::from_registry(head_states()),
        HeadState::Smiling,
    )?;

    commands.entity(entity).insert((
        Name::new("PlayerHead"),
        head,
        machine,
        Sprite {
            color: Color::srgb(0.95, 0.8, 0.6),
            custom_size: Some(Vec2::splat(18.0)),
            ..default()
        },
        Transform::from_translation(HEAD_OFFSET.extend(0.1)),
        Visibility::Inherited,
        ChildOf(player),
        DespawnOnExit(GameState::InGame),
    ));
    Ok((entity, puker))
}

pub(crate) fn drive_heads(
    time: Res<Time>,
    tunables: Res<Tunables>,
    input: Res<PlayerCommands>,
    q_players: Query<(&Player, &StateMachine<Player>)>,
    mut q_heads: Query<(&mut Head, &mut StateMachine<Head>, &mut Transform, &ChildOf)>,
    mut requests: MessageWriter<FireRequest>,
) -> Result<(), BevyError> {
    let dt = time.delta_secs();

    for (mut head, mut machine, mut tf, child_of) in &mut q_heads {
        let Ok((player, player_machine)) = q_players.get(child_of.parent()) else {
            continue;
        };
        let h = &mut *head;
        let m = &mut *machine;

        h.animator.tick(dt);
        tf.translation.x = HEAD_OFFSET.x * player.facing;

        // An empty stomach or the exit sequence means no attack.
        if input.puke && player.stats.fullness > 0 && player_machine.is_in(PlayerState::Normal) {
            h.use_puker(m)?;
        }
        m.update(h, &())?;

        if h.take_shot_request() {
            let facing = player.facing;
            let mouth = HEAD_OFFSET + PUKER_OFFSET;
            let spread = puke_spread(h.animator.clip_index());
            requests.write(FireRequest {
                weapon: h.puker,
                origin: player.body.position + Vec2::new(mouth.x * facing, mouth.y),
                direction: facing,
                velocity: Vec2::new(
                    facing * (tunables.puke_speed + spread) + player.body.velocity.x,
                    0.0,
                ),
            });
        }
    }
    Ok(())
}

/// Each puke that actually left costs its player one unit of fullness.
pub(crate) fn consume_fullness(
    mut fired: MessageReader<ProjectileFired>,
    mut q_players: Query<(Entity, &mut Player)>,
    mut puked: MessageWriter<PlayerPuked>,
) {
    for ev in fired.read() {
        for (entity, mut player) in &mut q_players {
            if player.puker != Some(ev.weapon) {
                continue;
            }
            if player.stats.spend_fullness() {
                puked.write(PlayerPuked {
                    player: entity,
                    fullness: player.stats.fullness,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests;
