//! Fixed-capacity projectile pool.
//!
//! The pool owns the ordered slot list and the active-flag array. Capacity is fixed when the
//! pool is spawned. `acquire` scans and reserves in one `&mut self` call, so two fire
//! attempts can never interleave mid-scan.
//!
//! Inactive projectiles keep every physics component (no archetype moves). They are parked,
//! hidden, motionless, gravity-free and collide with nothing.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use super::components::{PooledProjectile, Projectile, ProjectileState};
use crate::common::{layers::Layer, state::GameState, tunables::Tunables};

/// Where inactive projectiles wait, far outside the level.
pub const PARKED: Vec3 = Vec3::new(0.0, -100_000.0, 2.0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectilePool {
    slots: Vec<Entity>,
    active: Vec<bool>,
}

impl ProjectilePool {
    pub fn new(slots: Vec<Entity>) -> Self {
        let active = vec![false; slots.len()];
        Self { slots, active }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.active_count()
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.active.get(slot).copied().unwrap_or(false)
    }

    pub fn slot_of(&self, entity: Entity) -> Option<usize> {
        self.slots.iter().position(|e| *e == entity)
    }

    /// Reserve the first inactive slot.
    pub fn acquire(&mut self) -> Option<(usize, Entity)> {
        let slot = self.active.iter().position(|a| !*a)?;
        self.active[slot] = true;
        Some((slot, self.slots[slot]))
    }

    /// Make `slot` reusable. Returns `false` if it was not active.
    pub fn release(&mut self, slot: usize) -> bool {
        match self.active.get_mut(slot) {
            Some(flag) if *flag => {
                *flag = false;
                true
            }
            _ => false,
        }
    }

    pub fn slots(&self) -> &[Entity] {
        &self.slots
    }
}

#[inline]
pub fn active_projectile_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerProjectile, [Layer::World, Layer::Enemy])
}

/// Membership kept, filters empty: collides with nothing.
#[inline]
pub fn inactive_projectile_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerProjectile, [] as [Layer; 0])
}

/// Pre-spawn `capacity` inactive puke projectiles owned by `weapon`.
pub fn spawn_pool(commands: &mut Commands, weapon: Entity, tunables: &Tunables) -> ProjectilePool {
    let friction = Friction::ZERO;
    let restitution = Restitution::new(0.0);

    let slots = (0..tunables.puke_pool_capacity)
        .map(|slot| {
            commands
                .spawn((
                    Name::new(format!("Puke({slot})")),
                    PooledProjectile,
                    ProjectileState::Inactive,
                    Projectile::new(
                        weapon,
                        slot,
                        tunables.puke_lifetime,
                        tunables.puke_max_distance,
                    ),
                    Sprite {
                        color: Color::srgb(0.55, 0.75, 0.2),
                        custom_size: Some(Vec2::splat(6.0)),
                        ..default()
                    },
                    Transform::from_translation(PARKED),
                    Visibility::Hidden,
                    (
                        RigidBody::Dynamic,
                        Collider::circle(3.0),
                        inactive_projectile_layers(),
                        GravityScale(0.0),
                        LinearVelocity(Vec2::ZERO),
                        restitution,
                        friction,
                        CollisionEventsEnabled,
                    ),
                    DespawnOnExit(GameState::InGame),
                ))
                .id()
        })
        .collect();

    ProjectilePool::new(slots)
}
