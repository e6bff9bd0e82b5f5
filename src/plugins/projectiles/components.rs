use bevy::prelude::*;

/// Marker for entities owned by a [`super::pool::ProjectilePool`].
#[derive(Component)]
pub struct PooledProjectile;

/// Projectile lifecycle.
///
/// `Inactive -> Active` only in the allocator, `Active -> PendingReturn` on hit or when the
/// travel envelope is exceeded, `PendingReturn -> Inactive` only in the return commit.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectileState {
    #[default]
    Inactive,
    Active,
    PendingReturn,
}

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    /// Weapon whose pool owns this projectile.
    pub weapon: Entity,
    /// Index in that pool.
    pub slot: usize,
    pub damage: i32,
    /// Where the current shot started.
    pub origin: Vec2,
    /// Runs from the current shot's launch; finished means the shot is spent.
    pub lifetime: Timer,
    pub max_distance: f32,
}

impl Projectile {
    pub fn new(weapon: Entity, slot: usize, lifetime: f32, max_distance: f32) -> Self {
        Self {
            weapon,
            slot,
            damage: 1,
            origin: Vec2::ZERO,
            lifetime: Timer::from_seconds(lifetime, TimerMode::Once),
            max_distance,
        }
    }

    #[inline]
    pub fn reset_for_fire(&mut self, origin: Vec2) {
        self.origin = origin;
        self.lifetime.reset();
    }

    /// Lifetime or travel distance used up.
    #[inline]
    pub fn envelope_exceeded(&self, pos: Vec2) -> bool {
        self.lifetime.is_finished()
            || pos.distance_squared(self.origin) > self.max_distance * self.max_distance
    }
}
