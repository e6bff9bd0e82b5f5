use std::time::Duration;

use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{
    drain_messages, ensure_messages, run_fallible_once, run_system_once, world_with_time,
};
use crate::plugins::player::new_player;

fn smiling_head() -> (Head, StateMachine<Head>) {
    let mut world = World::new();
    let puker = world.spawn_empty().id();
    attach(
        Head::new(puker),
        StateMachine::from_registry(head_states()),
        HeadState::Smiling,
    )
    .unwrap()
}

#[test]
fn start_puking_from_rest_plays_the_clip() {
    let (mut head, mut m) = smiling_head();
    assert_eq!(head.animator.frame(), 0);

    assert_eq!(head.use_puker(&mut m).unwrap(), Outcome::Handled);
    assert!(m.is_in(HeadState::Puking));
    assert!(head.animator.is_playing(&PUKE));

    // Already puking: the command means nothing here.
    assert_eq!(head.use_puker(&mut m).unwrap(), Outcome::NotHandled);
}

#[test]
fn start_puking_off_the_rest_frame_is_rejected_silently() {
    let (mut head, mut m) = smiling_head();
    m.drain_transitions().for_each(drop);
    head.animator.set_frame(3);

    for _ in 0..3 {
        assert_eq!(head.use_puker(&mut m).unwrap(), Outcome::Rejected);
    }
    assert!(m.is_in(HeadState::Smiling));
    assert_eq!(head.animator.frame(), 3);
    assert!(!m.has_pending_transitions());
}

#[test]
fn stop_puking_waits_for_the_clip() {
    let (mut head, mut m) = smiling_head();
    head.use_puker(&mut m).unwrap();

    head.animator.tick(0.05);
    assert_eq!(head.smile(&mut m).unwrap(), Outcome::Rejected);
    assert!(m.is_in(HeadState::Puking));

    head.animator.tick(1.0);
    assert_eq!(head.smile(&mut m).unwrap(), Outcome::Handled);
    assert!(m.is_in(HeadState::Smiling));
    assert_eq!(head.animator.frame(), 0);
}

#[test]
fn sprays_only_past_frame_five_then_returns_to_smiling() {
    let (mut head, mut m) = smiling_head();
    head.use_puker(&mut m).unwrap();

    head.animator.tick(0.05);
    m.update(&mut head, &()).unwrap();
    assert!(!head.take_shot_request());

    head.animator.tick(0.06);
    m.update(&mut head, &()).unwrap();
    assert!(head.take_shot_request());
    assert!(!head.take_shot_request(), "request is consumed");

    head.animator.tick(1.0);
    m.update(&mut head, &()).unwrap();
    assert!(m.is_in(HeadState::Smiling));
    assert!(!head.take_shot_request());
}

#[test]
fn spread_stays_in_range() {
    for i in 0..PUKE.frames.len() {
        let s = puke_spread(i);
        assert!((-75.0..75.0).contains(&s));
    }
}

// --------------------------------------------------------------------------------------
// Systems
// --------------------------------------------------------------------------------------

/// Player with a head child; the head is already past frame five of its clip.
fn world_with_spraying_head(fullness: u32) -> (World, Entity, Entity) {
    let mut world = world_with_time(Duration::from_millis(16));
    world.insert_resource(PlayerCommands {
        puke: true,
        ..default()
    });
    ensure_messages::<FireRequest>(&mut world);

    let puker = world.spawn_empty().id();
    let (mut player, player_m) = new_player(&Tunables::default(), Vec2::new(50.0, 10.0)).unwrap();
    player.stats.fullness = fullness;
    player.puker = Some(puker);
    let player_e = world.spawn((player, player_m)).id();

    let (mut head, mut m) = attach(
        Head::new(puker),
        StateMachine::from_registry(head_states()),
        HeadState::Smiling,
    )
    .unwrap();
    if fullness > 0 {
        head.use_puker(&mut m).unwrap();
        head.animator.tick(0.11);
    }
    let head_e = world
        .spawn((head, m, Transform::default(), ChildOf(player_e)))
        .id();
    (world, player_e, head_e)
}

#[test]
fn driver_requests_shots_through_the_puker() {
    let (mut world, _, head_e) = world_with_spraying_head(10);

    run_fallible_once(&mut world, drive_heads);

    let requests = drain_messages::<FireRequest>(&mut world);
    assert_eq!(requests.len(), 1);
    let req = requests[0];
    assert_eq!(req.weapon, world.get::<Head>(head_e).unwrap().puker);
    assert_eq!(req.direction, 1.0);
    assert!(req.origin.x > 50.0, "mouth is ahead of the player");
}

#[test]
fn empty_stomach_never_starts_the_attack() {
    let (mut world, _, head_e) = world_with_spraying_head(0);

    run_fallible_once(&mut world, drive_heads);

    assert!(drain_messages::<FireRequest>(&mut world).is_empty());
    assert!(
        world
            .get::<StateMachine<Head>>(head_e)
            .unwrap()
            .is_in(HeadState::Smiling)
    );
}

#[test]
fn fired_puke_costs_fullness_once_per_projectile() {
    let (mut world, player_e, _) = world_with_spraying_head(2);
    ensure_messages::<ProjectileFired>(&mut world);
    ensure_messages::<PlayerPuked>(&mut world);
    let puker = world.get::<Player>(player_e).unwrap().puker.unwrap();
    let other_weapon = world.spawn_empty().id();
    let projectile = world.spawn_empty().id();

    world.write_message(ProjectileFired {
        weapon: puker,
        projectile,
    });
    world.write_message(ProjectileFired {
        weapon: other_weapon,
        projectile,
    });
    run_system_once(&mut world, consume_fullness);

    assert_eq!(world.get::<Player>(player_e).unwrap().stats.fullness, 1);
    assert_eq!(
        drain_messages::<PlayerPuked>(&mut world),
        vec![PlayerPuked {
            player: player_e,
            fullness: 1,
        }]
    );
}
