//! Return commit: recycle projectiles back into their weapon's pool.
//!
//! This system is the "owner" of the *Inactive invariants*.
//!
//! Invariant: Inactive projectiles must be:
//! - hidden and parked
//! - velocity = 0, gravity off
//! - collide with nothing (filters empty)
//! - released in their pool (active flag cleared)

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState};
use super::pool::{PARKED, inactive_projectile_layers};
use super::weapon::Weapon;

pub fn return_to_pool_commit(
    mut q_weapons: Query<&mut Weapon>,
    mut q: Query<
        (
            Entity,
            &Projectile,
            &mut ProjectileState,
            &mut Transform,
            &mut Visibility,
            &mut LinearVelocity,
            &mut GravityScale,
            &mut CollisionLayers,
        ),
        With<PooledProjectile>,
    >,
) {
    for (e, projectile, mut state, mut tf, mut vis, mut vel, mut gravity, mut layers) in &mut q {
        if *state != ProjectileState::PendingReturn {
            continue;
        }

        *state = ProjectileState::Inactive;
        *vis = Visibility::Hidden;
        tf.translation = PARKED;
        vel.0 = Vec2::ZERO;
        gravity.0 = 0.0;
        *layers = inactive_projectile_layers();

        match q_weapons.get_mut(projectile.weapon) {
            Ok(mut weapon) => {
                if !weapon.pool.release(projectile.slot) {
                    warn!(
                        "projectile {e:?} returned to slot {} that was not active",
                        projectile.slot
                    );
                }
            }
            // Weapon already gone (level teardown); the projectile goes with it.
            Err(_) => debug!("projectile {e:?} outlived weapon {:?}", projectile.weapon),
        }
    }
}
