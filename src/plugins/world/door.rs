//! Exit door actor ("Duti Drop").
//!
//! ```text
//!   Closed  --open-->  Opened  --close-->  Closed
//!   any     --ruin-->  Ruined   (no handlers: can't be opened again)
//! ```
//!
//! The player touching a closed door opens it and starts the exit sequence. When the
//! countdown runs out the door is ruined.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::ecs::error::BevyError;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState};
use crate::fsm::{
    Actor, ActorPlugin, FsmResult, Outcome, StateDef, StateMachine, StateRegistry, attach,
};
use crate::plugins::animation::{Animator, Clip};
use crate::plugins::physics::BodySystems;
use crate::plugins::player::{DoorSpan, Player, PlayerContext};
use crate::plugins::timer::PoopTimerTimeout;

pub const DOOR_SIZE: Vec2 = Vec2::new(48.0, 96.0);
/// Door centre, standing on the floor near the right end of the level.
pub const DOOR_POSITION: Vec2 = Vec2::new(2380.0, 48.0);

pub static OPEN: Clip = Clip {
    name: "open",
    frames: &[0, 1, 2, 3],
    fps: 15.0,
    looping: false,
};

pub static CLOSE: Clip = Clip {
    name: "close",
    frames: &[3, 2, 1, 0],
    fps: 15.0,
    looping: false,
};

pub static STINK: Clip = Clip {
    name: "stink",
    frames: &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13],
    fps: 15.0,
    looping: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorState {
    Closed,
    Opened,
    Ruined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorEvent {
    Update,
    Open,
    Close,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Door {
    pub animator: Animator,
}

impl Actor for Door {
    type State = DoorState;
    type Event = DoorEvent;
    type Context = ();

    const UPDATE: DoorEvent = DoorEvent::Update;
    const NAME: &'static str = "door";
}

impl Door {
    pub fn open(&mut self, m: &mut StateMachine<Self>) -> FsmResult<Outcome> {
        m.handle(self, DoorEvent::Open, &())
    }

    pub fn close(&mut self, m: &mut StateMachine<Self>) -> FsmResult<Outcome> {
        m.handle(self, DoorEvent::Close, &())
    }

    /// Unconditional.
    pub fn ruin(&mut self, m: &mut StateMachine<Self>) -> FsmResult<()> {
        m.set_state(self, DoorState::Ruined)
    }

    pub fn span(center: Vec2) -> DoorSpan {
        DoorSpan {
            left: center.x - DOOR_SIZE.x * 0.5,
            right: center.x + DOOR_SIZE.x * 0.5,
        }
    }
}

pub fn door_states() -> StateRegistry<Door> {
    StateRegistry::new()
        .state(DoorState::Closed, StateDef::new().on(DoorEvent::Open, open))
        .state(DoorState::Opened, StateDef::new().on(DoorEvent::Close, close))
        .state(
            DoorState::Ruined,
            StateDef::new().on_enter(enter_ruined),
        )
}

fn enter_ruined(door: &mut Door, _: Option<DoorState>) {
    door.animator.restart(&STINK);
}

fn open(door: &mut Door, m: &mut StateMachine<Door>, _: &()) -> FsmResult<Outcome> {
    m.set_state(door, DoorState::Opened)?;
    door.animator.play(&OPEN);
    Ok(Outcome::Handled)
}

fn close(door: &mut Door, m: &mut StateMachine<Door>, _: &()) -> FsmResult<Outcome> {
    m.set_state(door, DoorState::Closed)?;
    door.animator.play(&CLOSE);
    Ok(Outcome::Handled)
}

pub fn plugin(app: &mut App) {
    app.add_plugins(ActorPlugin::<Door>::default())
        .add_systems(OnEnter(GameState::InGame), spawn_door)
        .add_systems(
            FixedUpdate,
            (drive_doors.in_set(BodySystems::Drive), ruin_on_timeout)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            player_reaches_door
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_door(mut commands: Commands) -> Result<(), BevyError> {
    let (door, machine) = attach(
        Door::default(),
        StateMachine::from_registry(door_states()),
        DoorState::Closed,
    )?;

    commands.spawn((
        Name::new("DutiDrop"),
        door,
        machine,
        Sprite::from_color(Color::srgb(0.2, 0.45, 0.8), DOOR_SIZE),
        Transform::from_translation(DOOR_POSITION.extend(0.5)),
        RigidBody::Static,
        Collider::rectangle(DOOR_SIZE.x, DOOR_SIZE.y),
        Sensor,
        CollisionLayers::new(Layer::Door, [Layer::Player]),
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    ));
    Ok(())
}

fn drive_doors(
    time: Res<Time>,
    mut q: Query<(&mut Door, &mut StateMachine<Door>)>,
) -> Result<(), BevyError> {
    let dt = time.delta_secs();
    for (mut door, mut machine) in &mut q {
        door.animator.tick(dt);
        machine.update(&mut door, &())?;
    }
    Ok(())
}

pub(super) fn ruin_on_timeout(
    mut timeouts: MessageReader<PoopTimerTimeout>,
    mut q: Query<(&mut Door, &mut StateMachine<Door>)>,
) -> Result<(), BevyError> {
    if timeouts.read().count() == 0 {
        return Ok(());
    }
    for (mut door, mut machine) in &mut q {
        door.ruin(&mut machine)?;
        info!("time is up: the door is ruined");
    }
    Ok(())
}

/// A player entering a closed door's sensor opens it and starts the exit sequence.
pub(super) fn player_reaches_door(
    mut started: MessageReader<CollisionStart>,
    mut q_doors: Query<(&mut Door, &mut StateMachine<Door>)>,
    mut q_players: Query<(&mut Player, &mut StateMachine<Player>)>,
) -> Result<(), BevyError> {
    for ev in started.read() {
        let pair = [
            (ev.collider1, ev.body2.unwrap_or(ev.collider2)),
            (ev.collider2, ev.body1.unwrap_or(ev.collider1)),
        ];
        for (door_e, player_e) in pair {
            let Ok((mut door, mut door_machine)) = q_doors.get_mut(door_e) else {
                continue;
            };
            let Ok((mut player, mut player_machine)) = q_players.get_mut(player_e) else {
                continue;
            };

            if door.open(&mut door_machine)?.is_handled() {
                let outcome = player.exit_level(&mut player_machine, &PlayerContext::default())?;
                info!("door opened, player exit: {outcome:?}");
            }
        }
    }
    Ok(())
}
