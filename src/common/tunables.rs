//! Tunable gameplay constants.
//!
//! Insert a customised `Tunables` before registering the gameplay plugins to override
//! any of these; plugins read it once while building and again per frame where noted.

use std::time::Duration;

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    /// Downward acceleration in px/s².
    pub gravity: f32,

    // Player movement.
    pub player_move_accel: f32,
    pub player_max_speed: Vec2,
    pub player_drag: f32,
    pub jump_speed: f32,
    /// Seconds the upward part of a normal jump may last.
    pub max_jump_time: f32,
    /// Seconds after touching a wall during which a wall jump is allowed.
    pub wall_jump_window: f32,

    // Player stats.
    pub max_lives: u32,
    pub max_health: u32,
    pub max_fullness: u32,
    /// One unit of fullness is restored every period.
    pub stomach_fill_period: f32,

    // Worms.
    pub worm_move_accel: f32,
    pub worm_max_speed: Vec2,
    pub worm_health: i32,

    // Puke weapon.
    pub puke_cooldown: Duration,
    pub puke_pool_capacity: usize,
    pub puke_speed: f32,
    pub puke_lifetime: f32,
    pub puke_max_distance: f32,
    /// Legacy behaviour: a shot dropped because the pool is empty still starts the cooldown.
    pub consume_cooldown_on_exhaustion: bool,

    /// Seconds on the level countdown.
    pub level_seconds: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            gravity: 1000.0,

            player_move_accel: 800.0,
            player_max_speed: Vec2::new(300.0, 10_000.0),
            player_drag: 1500.0,
            jump_speed: 350.0,
            max_jump_time: 0.25,
            wall_jump_window: 0.35,

            max_lives: 3,
            max_health: 4,
            max_fullness: 50,
            stomach_fill_period: 1.5,

            worm_move_accel: 1200.0,
            worm_max_speed: Vec2::new(75.0, 1000.0),
            worm_health: 1,

            puke_cooldown: Duration::from_millis(40),
            puke_pool_capacity: 32,
            puke_speed: 220.0,
            puke_lifetime: 1.5,
            puke_max_distance: 600.0,
            consume_cooldown_on_exhaustion: true,

            level_seconds: 120,
        }
    }
}
