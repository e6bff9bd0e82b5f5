//! Weapon messages.
//!
//! Producers (actor drivers) only write [`FireRequest`]; the allocator is the single writer
//! of pool state and reports what happened through [`ProjectileFired`]. Nothing is emitted
//! for a suppressed request.

use bevy::prelude::*;

#[derive(Message, Clone, Copy, Debug)]
pub struct FireRequest {
    pub weapon: Entity,
    pub origin: Vec2,
    /// Horizontal facing, `1.0` or `-1.0`.
    pub direction: f32,
    pub velocity: Vec2,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileFired {
    pub weapon: Entity,
    pub projectile: Entity,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileHit {
    pub weapon: Entity,
    pub projectile: Entity,
    pub victim: Entity,
    pub damage: i32,
}
