//! Player actor.
//!
//! ```text
//!   Normal        input commands, jump timer, sprite frame; ExitLevel -> ApproachExit
//!   ApproachExit  walk right until past the door, then -> PerformExit
//!   PerformExit   walk back into the door; raises `exited` once inside
//! ```
//!
//! Input commands and damage are only registered on `Normal`, so the exit sequence can't be
//! interrupted and the player is invulnerable while leaving.

use bevy::prelude::*;

use super::stats::PlayerStats;
use crate::common::tunables::Tunables;
use crate::fsm::{Actor, FsmResult, Outcome, StateDef, StateMachine, StateRegistry};
use crate::plugins::animation::{Animator, Clip};
use crate::plugins::physics::Body;

/// Collider size in pixels.
pub const PLAYER_SIZE: Vec2 = Vec2::new(26.0, 29.0);

/// Downward speed while sliding along a wall.
const WALL_SLIDE_SPEED: f32 = 50.0;
/// Knockback launch velocity (x away from the source).
const KNOCKBACK: Vec2 = Vec2::new(200.0, 200.0);

pub(super) mod frames {
    pub const IDLE: usize = 0;
    pub const JUMP_START: usize = 5;
    pub const RISING: usize = 10;
    pub const FALLING: usize = 11;
    pub const WALL_SLIDE: usize = 12;
}

pub static WALK: Clip = Clip {
    name: "walk",
    frames: &[2, 3, 4, 5, 6, 7, 8, 9],
    fps: 40.0,
    looping: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Normal,
    ApproachExit,
    PerformExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    Update,
    Jump,
    EndJump,
    MoveLeft,
    MoveRight,
    StopMoving,
    Damage,
    ExitLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Right,
}

/// Horizontal extent of the exit door.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorSpan {
    pub left: f32,
    pub right: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerContext {
    pub door: Option<DoorSpan>,
}

/// A pending hit, applied on the next dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knock {
    pub amount: u32,
    pub from_x: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerMotion {
    pub move_accel: f32,
    pub max_speed: Vec2,
    pub jump_speed: f32,
    pub max_jump_time: f32,
    pub wall_jump_window: f32,
    pub knockback_time: f32,
}

impl PlayerMotion {
    pub fn from_tunables(t: &Tunables) -> Self {
        Self {
            move_accel: t.player_move_accel,
            max_speed: t.player_max_speed,
            jump_speed: t.jump_speed,
            max_jump_time: t.max_jump_time,
            wall_jump_window: t.wall_jump_window,
            knockback_time: 0.25,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub motion: PlayerMotion,
    pub stats: PlayerStats,
    pub animator: Animator,
    /// `1.0` facing right, `-1.0` facing left.
    pub facing: f32,
    pub spawn_point: Vec2,
    /// The head's puke weapon, set once the head is spawned.
    pub puker: Option<Entity>,
    pub pending_hit: Option<Knock>,
    /// Player-local seconds. The deadlines below are on this clock.
    clock: f32,
    is_jumping: bool,
    jump_until: f32,
    wall_jump_until: f32,
    last_blocked: Option<WallSide>,
    knockback_until: f32,
    inside_door: bool,
    exited: bool,
}

impl Actor for Player {
    type State = PlayerState;
    type Event = PlayerEvent;
    type Context = PlayerContext;

    const UPDATE: PlayerEvent = PlayerEvent::Update;
    const NAME: &'static str = "player";
}

impl Player {
    pub fn new(tunables: &Tunables, spawn_point: Vec2) -> Self {
        let mut body = Body::new(tunables.player_drag, tunables.player_max_speed);
        body.position = spawn_point;
        Self {
            body,
            motion: PlayerMotion::from_tunables(tunables),
            stats: PlayerStats::from_tunables(tunables),
            animator: Animator::default(),
            facing: 1.0,
            spawn_point,
            puker: None,
            pending_hit: None,
            clock: 0.0,
            is_jumping: false,
            jump_until: 0.0,
            wall_jump_until: 0.0,
            last_blocked: None,
            knockback_until: 0.0,
            inside_door: false,
            exited: false,
        }
    }

    /// Advance the local clock and the animator.
    pub fn advance(&mut self, dt: f32) {
        self.clock += dt;
        self.animator.tick(dt);
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    pub fn is_knocked_back(&self) -> bool {
        self.knockback_until > self.clock
    }

    pub fn wall_jump_open(&self) -> Option<WallSide> {
        self.last_blocked.filter(|_| self.wall_jump_until > self.clock)
    }

    /// `true` once, after the player walked into the door.
    pub fn take_exited(&mut self) -> bool {
        std::mem::take(&mut self.exited)
    }

    /// Put the player back at the spawn point with full health.
    pub fn respawn(&mut self) {
        self.body.position = self.spawn_point;
        self.body.velocity = Vec2::ZERO;
        self.body.acceleration_x = 0.0;
        self.stats.health = self.stats.max_health;
        self.is_jumping = false;
        self.last_blocked = None;
        self.knockback_until = 0.0;
        self.pending_hit = None;
        self.facing = 1.0;
    }

    // Forwarders. Each returns the machine's authoritative outcome.

    pub fn jump(&mut self, m: &mut StateMachine<Self>, ctx: &PlayerContext) -> FsmResult<Outcome> {
        m.handle(self, PlayerEvent::Jump, ctx)
    }

    pub fn end_jump(
        &mut self,
        m: &mut StateMachine<Self>,
        ctx: &PlayerContext,
    ) -> FsmResult<Outcome> {
        m.handle(self, PlayerEvent::EndJump, ctx)
    }

    pub fn move_left(
        &mut self,
        m: &mut StateMachine<Self>,
        ctx: &PlayerContext,
    ) -> FsmResult<Outcome> {
        m.handle(self, PlayerEvent::MoveLeft, ctx)
    }

    pub fn move_right(
        &mut self,
        m: &mut StateMachine<Self>,
        ctx: &PlayerContext,
    ) -> FsmResult<Outcome> {
        m.handle(self, PlayerEvent::MoveRight, ctx)
    }

    pub fn stop_moving(
        &mut self,
        m: &mut StateMachine<Self>,
        ctx: &PlayerContext,
    ) -> FsmResult<Outcome> {
        m.handle(self, PlayerEvent::StopMoving, ctx)
    }

    pub fn exit_level(
        &mut self,
        m: &mut StateMachine<Self>,
        ctx: &PlayerContext,
    ) -> FsmResult<Outcome> {
        m.handle(self, PlayerEvent::ExitLevel, ctx)
    }

    /// Apply `pending_hit` if the current state accepts damage. The hit is dropped either way.
    pub fn take_damage(
        &mut self,
        m: &mut StateMachine<Self>,
        ctx: &PlayerContext,
    ) -> FsmResult<Outcome> {
        let outcome = m.handle(self, PlayerEvent::Damage, ctx)?;
        self.pending_hit = None;
        Ok(outcome)
    }

    // Motion primitives shared by input commands and the exit sequence.

    fn walk(&mut self, dir: f32) {
        if self.is_knocked_back() {
            return;
        }
        if self.body.on_floor() && !self.animator.is_playing(&WALK) {
            self.animator.restart(&WALK);
        }

        let (blocked_here, side) = if dir < 0.0 {
            (self.body.blocked_left(), WallSide::Left)
        } else {
            (self.body.blocked_right(), WallSide::Right)
        };
        let airborne = !self.body.on_floor();

        // Falling against the wall we push into: face away and slide slowly.
        if self.body.velocity.y < 0.0 && blocked_here && airborne {
            self.facing = -dir;
            self.body.velocity.y = -WALL_SLIDE_SPEED;
            self.animator.set_frame(frames::WALL_SLIDE);
        } else {
            self.facing = dir;
        }

        if blocked_here && airborne {
            self.wall_jump_until = self.clock + self.motion.wall_jump_window;
            self.last_blocked = Some(side);
        }

        self.body.acceleration_x = dir * self.motion.move_accel;
    }

    fn apply_knock(&mut self, knock: Knock) {
        self.stats.damage(knock.amount);
        let away = if self.body.position.x < knock.from_x { -1.0 } else { 1.0 };
        self.body.velocity = Vec2::new(away * KNOCKBACK.x, KNOCKBACK.y);
        self.body.acceleration_x = 0.0;
        self.is_jumping = false;
        self.knockback_until = self.clock + self.motion.knockback_time;
    }
}

pub fn player_states() -> StateRegistry<Player> {
    StateRegistry::new()
        .state(
            PlayerState::Normal,
            StateDef::new()
                .on(PlayerEvent::Update, update_normal)
                .on(PlayerEvent::Jump, jump)
                .on(PlayerEvent::EndJump, end_jump)
                .on(PlayerEvent::MoveLeft, move_left)
                .on(PlayerEvent::MoveRight, move_right)
                .on(PlayerEvent::StopMoving, stop_moving)
                .on(PlayerEvent::Damage, damage)
                .on(PlayerEvent::ExitLevel, exit_level),
        )
        .state(
            PlayerState::ApproachExit,
            StateDef::new()
                .on(PlayerEvent::Update, update_approach_exit)
                .on_enter(enter_approach_exit),
        )
        .state(
            PlayerState::PerformExit,
            StateDef::new().on(PlayerEvent::Update, update_perform_exit),
        )
}

fn update_normal(
    p: &mut Player,
    _: &mut StateMachine<Player>,
    _: &PlayerContext,
) -> FsmResult<Outcome> {
    let b = p.body;
    if p.is_jumping && b.velocity.y > 0.0 {
        p.animator.set_frame(frames::RISING);
    } else if !b.on_floor() && !b.on_wall() && b.velocity.y < 0.0 {
        p.animator.set_frame(frames::FALLING);
    } else if b.acceleration_x == 0.0 {
        p.animator.set_frame(frames::IDLE);
    }

    if p.clock > p.jump_until {
        p.is_jumping = false;
    }
    if p.is_jumping {
        p.body.velocity.y = p.motion.jump_speed;
    }
    Ok(Outcome::Handled)
}

fn jump(p: &mut Player, _: &mut StateMachine<Player>, _: &PlayerContext) -> FsmResult<Outcome> {
    if p.is_knocked_back() {
        return Ok(Outcome::Rejected);
    }

    if p.body.on_floor() {
        p.animator.set_frame(frames::JUMP_START);
        p.is_jumping = true;
        p.jump_until = p.clock + p.motion.max_jump_time;
        return Ok(Outcome::Handled);
    }

    let Some(side) = p.wall_jump_open() else {
        return Ok(Outcome::Rejected);
    };
    // Kick away from the wall with a shorter jump.
    let away = match side {
        WallSide::Left => 1.0,
        WallSide::Right => -1.0,
    };
    p.body.velocity.x = away * p.motion.max_speed.x * 0.8;
    p.animator.set_frame(frames::JUMP_START);
    p.is_jumping = true;
    p.jump_until = p.clock + p.motion.max_jump_time * 0.4;
    p.wall_jump_until = p.clock;
    Ok(Outcome::Handled)
}

fn end_jump(p: &mut Player, _: &mut StateMachine<Player>, _: &PlayerContext) -> FsmResult<Outcome> {
    p.is_jumping = false;
    Ok(Outcome::Handled)
}

fn move_left(
    p: &mut Player,
    _: &mut StateMachine<Player>,
    _: &PlayerContext,
) -> FsmResult<Outcome> {
    p.walk(-1.0);
    Ok(Outcome::Handled)
}

fn move_right(
    p: &mut Player,
    _: &mut StateMachine<Player>,
    _: &PlayerContext,
) -> FsmResult<Outcome> {
    p.walk(1.0);
    Ok(Outcome::Handled)
}

fn stop_moving(
    p: &mut Player,
    _: &mut StateMachine<Player>,
    _: &PlayerContext,
) -> FsmResult<Outcome> {
    p.body.acceleration_x = 0.0;
    Ok(Outcome::Handled)
}

fn damage(p: &mut Player, _: &mut StateMachine<Player>, _: &PlayerContext) -> FsmResult<Outcome> {
    let Some(knock) = p.pending_hit else {
        return Ok(Outcome::Rejected);
    };
    p.apply_knock(knock);
    Ok(Outcome::Handled)
}

fn exit_level(
    p: &mut Player,
    m: &mut StateMachine<Player>,
    _: &PlayerContext,
) -> FsmResult<Outcome> {
    m.set_state(p, PlayerState::ApproachExit)?;
    Ok(Outcome::Handled)
}

fn enter_approach_exit(p: &mut Player, _: Option<PlayerState>) {
    p.is_jumping = false;
    p.body.acceleration_x = 0.0;
}

fn update_approach_exit(
    p: &mut Player,
    m: &mut StateMachine<Player>,
    ctx: &PlayerContext,
) -> FsmResult<Outcome> {
    if !p.body.on_floor() {
        return Ok(Outcome::Handled);
    }
    let Some(door) = ctx.door else {
        return Ok(Outcome::Handled);
    };

    if door.right > p.body.position.x {
        p.walk(1.0);
    } else {
        m.set_state(p, PlayerState::PerformExit)?;
    }
    Ok(Outcome::Handled)
}

fn update_perform_exit(
    p: &mut Player,
    _: &mut StateMachine<Player>,
    ctx: &PlayerContext,
) -> FsmResult<Outcome> {
    if p.inside_door {
        p.body.acceleration_x = 0.0;
        return Ok(Outcome::Handled);
    }

    p.walk(-1.0);
    if let Some(door) = ctx.door {
        if door.left > p.body.position.x - PLAYER_SIZE.x {
            p.inside_door = true;
            p.exited = true;
        }
    }
    Ok(Outcome::Handled)
}

#[cfg(test)]
impl Player {
    pub(crate) fn set_clock(&mut self, clock: f32) {
        self.clock = clock;
    }
}
