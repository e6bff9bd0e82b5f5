//! Enemies plugin: patrolling worms.
//!
//! ```text
//!   Walking  --blocked-->  turn around          (accelerates only on walk frame 4)
//!   Walking  --falling-->  Flying               (walked off a ledge)
//!   Flying   --on floor--> Walking
//!   any      --die------>  Flying               (forced, no handler involved)
//! ```
//!
//! A listener on the machine switches the clip and horizontal drag whenever the mode changes,
//! so knockback and death both look right without every handler repeating that work.
//!
//! Lifecycle is tracked next to the machine in `EnemyLifeState`. Death never despawns inside
//! the fixed step: the worm stops interacting, pops up, fades, gets `PendingDespawn`, and is
//! removed in `PostUpdate`.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::ecs::error::BevyError;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy::time::Fixed;
use bevy_firefly::prelude::Occluder2d;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};
use crate::fsm::{
    Actor, ActorPlugin, FsmResult, Outcome, StateDef, StateMachine, StateRegistry, attach,
};
use crate::plugins::animation::{Animator, Clip};
use crate::plugins::physics::{Body, BodySense, BodySystems};
use crate::plugins::projectiles::collision::process_projectile_collisions;
use crate::plugins::projectiles::messages::ProjectileHit;
use crate::plugins::world::WORM_SPAWNS;

pub const WORM_SIZE: Vec2 = Vec2::new(24.0, 14.0);

pub const WALK_DRAG: f32 = 800.0;
pub const FLY_DRAG: f32 = 100.0;

/// Walk frame on which the worm pushes off.
const PUSH_FRAME: usize = 4;

/// Seconds between the killing hit and removal.
const DEATH_SECONDS: f32 = 0.6;
/// Upward speed given to a worm when it dies.
const DEATH_POP: f32 = 220.0;

pub static WALK: Clip = Clip {
    name: "walk",
    frames: &[0, 1, 2, 3, 4, 5],
    fps: 5.0,
    looping: false,
};

pub static FLYING: Clip = Clip {
    name: "flying",
    frames: &[9, 10, 11, 12],
    fps: 5.0,
    looping: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WormState {
    Walking,
    Flying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WormEvent {
    Update,
}

#[derive(Component, Debug, Clone)]
pub struct Worm {
    pub body: Body,
    pub animator: Animator,
    /// `1.0` right, `-1.0` left.
    pub facing: f32,
    pub health: i32,
    pub move_accel: f32,
}

impl Actor for Worm {
    type State = WormState;
    type Event = WormEvent;
    type Context = ();

    const UPDATE: WormEvent = WormEvent::Update;
    const NAME: &'static str = "worm";
}

impl Worm {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            body: Body::new(WALK_DRAG, tunables.worm_max_speed),
            animator: Animator::default(),
            facing: 1.0,
            health: tunables.worm_health,
            move_accel: tunables.worm_move_accel,
        }
    }

    pub fn update(&mut self, m: &mut StateMachine<Self>) -> FsmResult<Outcome> {
        m.update(self, &())
    }

    /// Unconditional switch to `Flying`.
    pub fn die(&mut self, m: &mut StateMachine<Self>) -> FsmResult<()> {
        m.set_state(self, WormState::Flying)
    }

    /// Take `damage`. Returns `true` when this hit was the killing one.
    pub fn hurt(&mut self, damage: i32) -> bool {
        let was_alive = self.health > 0;
        self.health -= damage;
        was_alive && self.health <= 0
    }

    /// Inch toward `dir` (`1.0` / `-1.0`).
    fn crawl(&mut self, dir: f32) {
        let max = self.body.max_velocity.x;
        if self.body.velocity.x * dir >= max {
            self.body.velocity.x = max * dir;
        }

        self.animator.play(&WALK);

        let blocked = if dir < 0.0 {
            self.body.blocked_left()
        } else {
            self.body.blocked_right()
        };
        self.facing = if blocked { -dir } else { dir };

        // Let drag stop a reversal before pushing the other way.
        if self.body.acceleration_x * dir < 0.0 {
            self.body.acceleration_x = 0.0;
        }
        if self.body.velocity.x * dir >= 0.0 && self.animator.frame() == PUSH_FRAME {
            self.body.acceleration_x = self.move_accel * dir;
        }
    }
}

pub fn worm_states() -> StateRegistry<Worm> {
    StateRegistry::new()
        .state(
            WormState::Walking,
            StateDef::new().on(WormEvent::Update, update_walking),
        )
        .state(
            WormState::Flying,
            StateDef::new().on(WormEvent::Update, update_flying),
        )
}

fn update_walking(worm: &mut Worm, m: &mut StateMachine<Worm>, _: &()) -> FsmResult<Outcome> {
    if !worm.body.on_floor() && worm.body.velocity.y < 0.0 {
        m.set_state(worm, WormState::Flying)?;
        return Ok(Outcome::Handled);
    }

    let dir = if worm.facing < 0.0 {
        if worm.body.blocked_left() { 1.0 } else { -1.0 }
    } else if worm.body.blocked_right() {
        -1.0
    } else {
        1.0
    };
    worm.crawl(dir);
    Ok(Outcome::Handled)
}

fn update_flying(worm: &mut Worm, m: &mut StateMachine<Worm>, _: &()) -> FsmResult<Outcome> {
    if worm.body.on_floor() {
        m.set_state(worm, WormState::Walking)?;
    }
    Ok(Outcome::Handled)
}

fn on_mode_change(worm: &mut Worm, _: Option<WormState>, to: WormState) {
    match to {
        WormState::Flying => {
            worm.animator.play(&FLYING);
            worm.body.drag_x = FLY_DRAG;
        }
        WormState::Walking => worm.body.drag_x = WALK_DRAG,
    }
}

pub fn new_worm(tunables: &Tunables) -> FsmResult<(Worm, StateMachine<Worm>)> {
    attach(
        Worm::new(tunables),
        StateMachine::from_registry(worm_states()).with_listener(on_mode_change),
        WormState::Walking,
    )
}

/// Enemy lifecycle, kept outside the machine so a dead worm can still be `Flying`.
#[derive(Component, Debug, Clone)]
pub enum EnemyLifeState {
    Alive,
    Dying { timer: Timer },
    Dead,
}

/// Marker: remove in `PostUpdate`.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

/// Membership kept, filters cleared: a dying worm touches nothing.
#[inline]
pub fn non_interacting_enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [] as [Layer; 0])
}

#[inline]
pub fn worm_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Enemy,
        [Layer::World, Layer::Player, Layer::PlayerProjectile],
    )
}

pub fn plugin(app: &mut App) {
    app.add_plugins(ActorPlugin::<Worm>::default());

    app.add_systems(OnEnter(GameState::InGame), spawn_worms);

    app.add_systems(
        FixedUpdate,
        drive_worms
            .in_set(BodySystems::Drive)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        (apply_projectile_hits, enemy_death_progress)
            .chain()
            .after(process_projectile_collisions)
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(Update, sync_worm_sprites.run_if(in_state(GameState::InGame)));

    // Structural cleanup once fixed-step work is done.
    app.add_systems(
        PostUpdate,
        despawn_marked_enemies.run_if(in_state(GameState::InGame)),
    );
}

fn spawn_worms(mut commands: Commands, tunables: Res<Tunables>) -> Result<(), BevyError> {
    for (i, at) in WORM_SPAWNS.into_iter().enumerate() {
        let (worm, machine) = new_worm(&tunables)?;

        commands.spawn((
            Name::new(format!("Worm{i}")),
            worm,
            machine,
            EnemyLifeState::Alive,
            Sprite {
                color: Color::srgb(0.8, 0.45, 0.55),
                custom_size: Some(WORM_SIZE),
                ..default()
            },
            Transform::from_translation(at.extend(1.0)),
            (
                RigidBody::Dynamic,
                Collider::rectangle(WORM_SIZE.x, WORM_SIZE.y),
                LockedAxes::ROTATION_LOCKED,
                worm_layers(),
                LinearVelocity::ZERO,
                Friction::ZERO,
                BodySense::default(),
            ),
            Occluder2d::circle(WORM_SIZE.y * 0.5),
            DespawnOnExit(GameState::InGame),
        ));
    }
    debug!("spawned {} worms", WORM_SPAWNS.len());
    Ok(())
}

/// Behaviour runs only while alive; a dying worm keeps animating and falls freely.
pub(crate) fn drive_worms(
    time: Res<Time>,
    mut q: Query<(
        &mut Worm,
        &mut StateMachine<Worm>,
        &EnemyLifeState,
        &Transform,
        &mut LinearVelocity,
        &BodySense,
    )>,
) -> Result<(), BevyError> {
    let dt = time.delta_secs();

    for (mut worm, mut machine, life, tf, mut vel, sense) in &mut q {
        let w = &mut *worm;
        w.animator.tick(dt);

        if !matches!(life, EnemyLifeState::Alive) {
            continue;
        }

        w.body.load(tf, &vel, sense);
        // No push unless a handler applies one this step.
        w.body.acceleration_x = 0.0;

        w.update(&mut machine)?;
        w.body.integrate(dt);
        w.body.store(&mut vel);
    }
    Ok(())
}

/// Apply `ProjectileHit`s to worms; a killing hit starts the death sequence.
pub(crate) fn apply_projectile_hits(
    mut hits: MessageReader<ProjectileHit>,
    mut q: Query<
        (
            &mut Worm,
            &mut StateMachine<Worm>,
            &mut EnemyLifeState,
            &mut CollisionLayers,
            &mut LinearVelocity,
        ),
        Without<PendingDespawn>,
    >,
) -> Result<(), BevyError> {
    for hit in hits.read() {
        let Ok((mut worm, mut machine, mut life, mut layers, mut vel)) = q.get_mut(hit.victim)
        else {
            continue;
        };
        if !matches!(*life, EnemyLifeState::Alive) {
            continue;
        }
        if !worm.hurt(hit.damage) {
            continue;
        }

        worm.die(&mut machine)?;
        *life = EnemyLifeState::Dying {
            timer: Timer::from_seconds(DEATH_SECONDS, TimerMode::Once),
        };
        *layers = non_interacting_enemy_layers();
        vel.0 = Vec2::new(-worm.facing * worm.body.max_velocity.x, DEATH_POP);
        info!("worm {:?} killed", hit.victim);
    }
    Ok(())
}

/// Fade dying worms and mark them for removal once the timer runs out.
fn enemy_death_progress(
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut EnemyLifeState, &mut Sprite), Without<PendingDespawn>>,
) {
    for (e, mut life, mut sprite) in &mut q {
        let EnemyLifeState::Dying { timer } = &mut *life else {
            continue;
        };

        timer.tick(time.delta());

        let t = timer.fraction();
        let mut c = sprite.color.to_srgba();
        c.alpha = 1.0 - t;
        sprite.color = c.into();

        if timer.is_finished() {
            *life = EnemyLifeState::Dead;
            commands.entity(e).insert(PendingDespawn);
        }
    }
}

fn sync_worm_sprites(mut q: Query<(&Worm, &mut Sprite)>) {
    for (worm, mut sprite) in &mut q {
        let flip = worm.facing < 0.0;
        if sprite.flip_x != flip {
            sprite.flip_x = flip;
        }
    }
}

fn despawn_marked_enemies(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
