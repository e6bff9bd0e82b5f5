use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use super::actor::{DoorSpan, WALK, WallSide, frames};
use super::*;
use crate::common::test_utils::{
    drain_messages, ensure_messages, run_fallible_once, run_system_once, world_with_time,
};
use crate::fsm::Outcome;
use crate::plugins::head::Head;
use crate::plugins::physics::BodySense;
use crate::plugins::projectiles::weapon::Weapon;

const FLOOR: BodySense = BodySense {
    on_floor: true,
    blocked_left: false,
    blocked_right: false,
};

fn player_at(pos: Vec2) -> (Player, StateMachine<Player>) {
    new_player(&Tunables::default(), pos).unwrap()
}

fn no_door() -> PlayerContext {
    PlayerContext::default()
}

// --------------------------------------------------------------------------------------
// Stats
// --------------------------------------------------------------------------------------

#[test]
fn stats_clamp_to_their_maximums() {
    let mut s = PlayerStats::from_tunables(&Tunables::default());
    s.heal(10);
    assert_eq!(s.health, s.max_health);
    s.add_life(5);
    assert_eq!(s.lives, s.max_lives);

    assert_eq!(s.damage(10), 0);
    assert_eq!(s.remove_life(0), s.max_lives - 1);

    s.remove_max_life(2);
    assert_eq!(s.max_lives, 1);
    assert_eq!(s.lives, 1);
}

#[test]
fn stomach_refills_one_unit_per_period() {
    let mut s = PlayerStats::from_tunables(&Tunables::default());
    s.fullness = 0;
    assert!(!s.spend_fullness());

    // Default fill period is 1.5 s.
    assert_eq!(s.tick_stomach(Duration::from_millis(1000)), 0);
    assert_eq!(s.tick_stomach(Duration::from_millis(2500)), 2);
    assert_eq!(s.fullness, 2);
    assert!(s.spend_fullness());
    assert_eq!(s.fullness, 1);

    // Refills stop at the stomach's capacity.
    s.tick_stomach(Duration::from_secs(60));
    assert_eq!(s.fullness, s.max_fullness);
}

// --------------------------------------------------------------------------------------
// Commands
// --------------------------------------------------------------------------------------

#[test]
fn walking_sets_acceleration_and_facing() {
    let (mut p, mut m) = player_at(Vec2::ZERO);
    p.body.sense = FLOOR;

    assert_eq!(p.move_left(&mut m, &no_door()).unwrap(), Outcome::Handled);
    assert_eq!(p.body.acceleration_x, -p.motion.move_accel);
    assert_eq!(p.facing, -1.0);
    assert!(p.animator.is_playing(&actor::WALK));

    p.stop_moving(&mut m, &no_door()).unwrap();
    assert_eq!(p.body.acceleration_x, 0.0);
}

#[test]
fn jump_needs_floor_or_open_wall_window() {
    let (mut p, mut m) = player_at(Vec2::ZERO);

    // Airborne, no wall: nothing happens.
    assert_eq!(p.jump(&mut m, &no_door()).unwrap(), Outcome::Rejected);
    assert!(!p.is_jumping());

    p.body.sense = FLOOR;
    assert_eq!(p.jump(&mut m, &no_door()).unwrap(), Outcome::Handled);
    m.update(&mut p, &no_door()).unwrap();
    assert_eq!(p.body.velocity.y, p.motion.jump_speed);

    p.end_jump(&mut m, &no_door()).unwrap();
    assert!(!p.is_jumping());
}

#[test]
fn rejected_jump_leaves_the_animation_alone() {
    let (mut p, mut m) = player_at(Vec2::ZERO);
    p.animator.play(&WALK);
    p.animator.tick(0.06);
    let shown = p.animator.frame();

    assert_eq!(p.jump(&mut m, &no_door()).unwrap(), Outcome::Rejected);
    assert_eq!(p.animator.frame(), shown);
    assert!(!p.animator.is_finished());

    p.body.sense = FLOOR;
    assert_eq!(p.jump(&mut m, &no_door()).unwrap(), Outcome::Handled);
    assert_eq!(p.animator.frame(), frames::JUMP_START);
}

#[test]
fn sliding_down_a_wall_opens_the_wall_jump_window() {
    let (mut p, mut m) = player_at(Vec2::ZERO);
    p.body.sense = BodySense {
        blocked_right: true,
        ..default()
    };
    p.body.velocity.y = -200.0;

    p.move_right(&mut m, &no_door()).unwrap();
    assert_eq!(p.body.velocity.y, -50.0);
    assert_eq!(p.facing, -1.0, "faces away from the wall");
    assert_eq!(p.wall_jump_open(), Some(WallSide::Right));

    p.body.sense = BodySense::default();
    assert_eq!(p.jump(&mut m, &no_door()).unwrap(), Outcome::Handled);
    assert!(p.body.velocity.x < 0.0, "kicks away to the left");
    assert_eq!(p.wall_jump_open(), None, "one wall jump per window");

    // The window closes with time.
    p.move_right(&mut m, &no_door()).unwrap();
    p.body.sense.blocked_right = true;
    p.move_right(&mut m, &no_door()).unwrap();
    p.set_clock(p.clock() + p.motion.wall_jump_window + 0.01);
    p.body.sense = BodySense::default();
    assert_eq!(p.jump(&mut m, &no_door()).unwrap(), Outcome::Rejected);
}

#[test]
fn damage_lands_only_under_player_control() {
    let (mut p, mut m) = player_at(Vec2::new(10.0, 0.0));
    let full = p.stats.health;

    p.pending_hit = Some(Knock { amount: 1, from_x: 20.0 });
    assert_eq!(p.take_damage(&mut m, &no_door()).unwrap(), Outcome::Handled);
    assert_eq!(p.stats.health, full - 1);
    assert!(p.body.velocity.x < 0.0, "knocked away from the source");
    assert!(p.is_knocked_back());
    assert_eq!(p.jump(&mut m, &no_door()).unwrap(), Outcome::Rejected);

    p.exit_level(&mut m, &no_door()).unwrap();
    p.pending_hit = Some(Knock { amount: 1, from_x: 20.0 });
    assert_eq!(p.take_damage(&mut m, &no_door()).unwrap(), Outcome::NotHandled);
    assert_eq!(p.stats.health, full - 1);
    assert_eq!(p.pending_hit, None);
}

#[test]
fn exit_level_only_from_normal() {
    let (mut p, mut m) = player_at(Vec2::ZERO);
    assert_eq!(p.exit_level(&mut m, &no_door()).unwrap(), Outcome::Handled);
    assert!(m.is_in(PlayerState::ApproachExit));

    assert_eq!(p.exit_level(&mut m, &no_door()).unwrap(), Outcome::NotHandled);
    assert_eq!(p.move_left(&mut m, &no_door()).unwrap(), Outcome::NotHandled);
    assert!(m.is_in(PlayerState::ApproachExit));
}

#[test]
fn exit_sequence_walks_past_the_door_then_back_in() {
    let door = DoorSpan {
        left: 100.0,
        right: 150.0,
    };
    let ctx = PlayerContext { door: Some(door) };
    let (mut p, mut m) = player_at(Vec2::new(90.0, 0.0));
    p.body.sense = FLOOR;
    p.exit_level(&mut m, &ctx).unwrap();

    m.update(&mut p, &ctx).unwrap();
    assert!(m.is_in(PlayerState::ApproachExit));
    assert!(p.body.acceleration_x > 0.0);

    p.body.position.x = 160.0;
    m.update(&mut p, &ctx).unwrap();
    assert!(m.is_in(PlayerState::PerformExit));
    assert!(!p.take_exited());

    m.update(&mut p, &ctx).unwrap();
    assert!(p.body.acceleration_x < 0.0);
    assert!(!p.take_exited());

    p.body.position.x = 120.0;
    m.update(&mut p, &ctx).unwrap();
    assert!(p.take_exited());
    m.update(&mut p, &ctx).unwrap();
    assert!(!p.take_exited(), "reported once");
}

// --------------------------------------------------------------------------------------
// Systems
// --------------------------------------------------------------------------------------

fn driver_world() -> World {
    let mut world = world_with_time(Duration::from_millis(16));
    world.insert_resource(PlayerCommands::default());
    ensure_messages::<PlayerExited>(&mut world);
    ensure_messages::<PlayerDied>(&mut world);
    world
}

fn spawn_driven(world: &mut World, pos: Vec2) -> Entity {
    world
        .spawn((
            player_at(pos),
            Transform::from_translation(pos.extend(1.0)),
            LinearVelocity::ZERO,
            FLOOR,
        ))
        .id()
}

#[test]
fn spawn_creates_player_with_head_and_puker() {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    run_fallible_once(&mut world, super::spawn);

    let (player_e, puker) = {
        let mut q = world.query::<(Entity, &Player)>();
        let (e, p) = q.single(&world).unwrap();
        (e, p.puker.unwrap())
    };

    assert!(world.get::<Weapon>(puker).is_some());
    let mut heads = world.query::<(&Head, &ChildOf)>();
    let (head, parent) = heads.single(&world).unwrap();
    assert_eq!(parent.parent(), player_e);
    assert_eq!(head.puker, puker);
}

#[test]
fn driver_turns_commands_into_velocity() {
    let mut world = driver_world();
    let e = spawn_driven(&mut world, Vec2::ZERO);
    world.resource_mut::<PlayerCommands>().move_x = 1.0;

    run_fallible_once(&mut world, drive_player);

    let vel = world.get::<LinearVelocity>(e).unwrap().0;
    assert!(vel.x > 0.0);
    assert_eq!(world.get::<Player>(e).unwrap().facing, 1.0);
}

#[test]
fn falling_out_costs_a_life_and_respawns() {
    let mut world = driver_world();
    let e = spawn_driven(&mut world, Vec2::new(40.0, 20.0));
    world.get_mut::<Transform>(e).unwrap().translation = Vec3::new(500.0, KILL_PLANE_Y - 10.0, 1.0);

    run_fallible_once(&mut world, drive_player);

    let died = drain_messages::<PlayerDied>(&mut world);
    let max = Tunables::default().max_lives;
    assert_eq!(died, vec![PlayerDied { entity: e, lives_left: max - 1 }]);
    assert_eq!(
        world.get::<Transform>(e).unwrap().translation.truncate(),
        Vec2::new(40.0, 20.0)
    );
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::ZERO);
}

#[test]
fn last_life_is_reported_once() {
    let mut world = driver_world();
    let e = spawn_driven(&mut world, Vec2::ZERO);
    world.get_mut::<Transform>(e).unwrap().translation.y = KILL_PLANE_Y - 10.0;
    world.get_mut::<Player>(e).unwrap().stats.lives = 1;

    run_fallible_once(&mut world, drive_player);
    drain_messages::<PlayerDied>(&mut world);
    assert_eq!(world.get::<Player>(e).unwrap().stats.lives, 0);

    run_fallible_once(&mut world, drive_player);
    assert!(drain_messages::<PlayerDied>(&mut world).is_empty());
}

#[test]
fn enemy_contact_queues_a_hit() {
    let mut world = World::new();
    ensure_messages::<CollisionStart>(&mut world);
    let player = world.spawn(player_at(Vec2::ZERO)).id();
    let worm = world
        .spawn((
            Transform::from_xyz(30.0, 0.0, 0.0),
            CollisionLayers::new(Layer::Enemy, [Layer::Player]),
        ))
        .id();

    world.write_message(CollisionStart {
        collider1: worm,
        collider2: player,
        body1: Some(worm),
        body2: Some(player),
    });
    run_system_once(&mut world, player_contacts);

    assert_eq!(
        world.get::<Player>(player).unwrap().pending_hit,
        Some(Knock { amount: 1, from_x: 30.0 })
    );
}

#[test]
fn wall_contact_is_not_a_hit() {
    let mut world = World::new();
    ensure_messages::<CollisionStart>(&mut world);
    let player = world.spawn(player_at(Vec2::ZERO)).id();
    let wall = world
        .spawn(CollisionLayers::new(Layer::World, [Layer::Player]))
        .id();

    world.write_message(CollisionStart {
        collider1: player,
        collider2: wall,
        body1: Some(player),
        body2: None,
    });
    run_system_once(&mut world, player_contacts);

    assert_eq!(world.get::<Player>(player).unwrap().pending_hit, None);
}
