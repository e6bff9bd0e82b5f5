//! Hit resolution for active projectiles.
//!
//! Avian reports overlaps; this system only decides what a hit means:
//! - world geometry: the projectile splats and returns to the pool
//! - enemy: a `ProjectileHit` is written for the victim's owner, then the projectile returns
//!
//! Damage itself is applied by whoever owns the victim (see the enemies plugin).

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState};
use super::messages::ProjectileHit;
use crate::common::layers::Layer;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionTarget {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

#[inline]
fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

pub fn process_projectile_collisions(
    mut started: MessageReader<CollisionStart>,
    mut hits: MessageWriter<ProjectileHit>,
    q_is_projectile: Query<(), With<PooledProjectile>>,
    mut q_projectiles: Query<(&Projectile, &mut ProjectileState), With<PooledProjectile>>,
    q_layers: Query<&CollisionLayers>,
    // Per-frame dedupe: one resolution per projectile.
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let p1 = q_is_projectile.contains(t1.collider);
        let p2 = q_is_projectile.contains(t2.collider);
        if !(p1 ^ p2) {
            continue; // must be exactly one projectile
        }
        let (projectile_side, other_side) = if p1 { (t1, t2) } else { (t2, t1) };

        if !seen.insert(projectile_side.collider) {
            continue;
        }

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };

        let Ok((projectile, mut state)) = q_projectiles.get_mut(projectile_side.collider) else {
            continue;
        };

        // Inactive projectiles have empty filters, but a stale event may still arrive.
        if *state != ProjectileState::Active {
            continue;
        }

        if is_in_layer(other_layers, Layer::Enemy) {
            hits.write(ProjectileHit {
                weapon: projectile.weapon,
                projectile: projectile_side.collider,
                victim: other_side.gameplay_owner(),
                damage: projectile.damage,
            });
            *state = ProjectileState::PendingReturn;
        } else if is_in_layer(other_layers, Layer::World) {
            *state = ProjectileState::PendingReturn;
        }
    }
}
