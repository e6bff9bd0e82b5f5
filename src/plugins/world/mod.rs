//! World plugin: side-scrolling level geometry and the exit door.
//!
//! The level is built from solid-colour blocks so the project needs no assets. Floor top is
//! at `y = 0`; the gap in the floor drops into the kill plane.

pub mod door;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState};

pub const SPAWN_POINT: Vec2 = Vec2::new(96.0, 40.0);
/// Falling below this costs a life.
pub const KILL_PLANE_Y: f32 = -400.0;
pub const LEVEL_LEFT: f32 = -160.0;
pub const LEVEL_RIGHT: f32 = 2560.0;
/// Patrol start points for worms.
pub const WORM_SPAWNS: [Vec2; 3] = [
    Vec2::new(520.0, 24.0),
    Vec2::new(1380.0, 24.0),
    Vec2::new(1820.0, 150.0),
];

const FLOOR_THICKNESS: f32 = 40.0;
const WALL_WIDTH: f32 = 40.0;
const WALL_HEIGHT: f32 = 720.0;

/// `(left, right)` x extents of the floor segments.
const FLOOR_SEGMENTS: [(f32, f32); 2] = [(LEVEL_LEFT, 900.0), (1060.0, LEVEL_RIGHT)];

/// `(centre, size)` of floating platforms.
const PLATFORMS: [(Vec2, Vec2); 3] = [
    (Vec2::new(700.0, 110.0), Vec2::new(160.0, 20.0)),
    (Vec2::new(980.0, 180.0), Vec2::new(120.0, 20.0)),
    (Vec2::new(1820.0, 120.0), Vec2::new(220.0, 20.0)),
];

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_level);
    door::plugin(app);
}

#[inline]
pub fn world_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::World,
        [Layer::Player, Layer::Enemy, Layer::PlayerProjectile],
    )
}

fn spawn_level(mut commands: Commands) {
    let ground = Color::srgb(0.25, 0.22, 0.18);
    let wall = Color::srgb(0.3, 0.3, 0.35);

    let mut spawn_block = |name: String, center: Vec2, size: Vec2, color: Color| {
        commands.spawn((
            Name::new(name),
            Sprite::from_color(color, size),
            Transform::from_translation(center.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            world_layers(),
            DespawnOnExit(GameState::InGame),
        ));
    };

    for (i, (left, right)) in FLOOR_SEGMENTS.into_iter().enumerate() {
        spawn_block(
            format!("Floor{i}"),
            Vec2::new((left + right) * 0.5, -FLOOR_THICKNESS * 0.5),
            Vec2::new(right - left, FLOOR_THICKNESS),
            ground,
        );
    }

    for (i, (center, size)) in PLATFORMS.into_iter().enumerate() {
        spawn_block(format!("Platform{i}"), center, size, ground);
    }

    // Tall walls at both ends double as wall-jump practice.
    spawn_block(
        "WallLeft".into(),
        Vec2::new(LEVEL_LEFT - WALL_WIDTH * 0.5, WALL_HEIGHT * 0.5),
        Vec2::new(WALL_WIDTH, WALL_HEIGHT),
        wall,
    );
    spawn_block(
        "WallRight".into(),
        Vec2::new(LEVEL_RIGHT + WALL_WIDTH * 0.5, WALL_HEIGHT * 0.5),
        Vec2::new(WALL_WIDTH, WALL_HEIGHT),
        wall,
    );
}
