//! Fire consumer: gate requests through each weapon and launch pooled projectiles.
//!
//! # Fail-fast invariants
//! - A pool only contains entities spawned by `spawn_pool`, so every reserved entity matches
//!   the projectile query. A mismatch is a bug and is returned as a system error.
//!
//! Cooldown suppression and pool exhaustion are outcomes, not errors: they are counted on
//! the weapon and logged, and no `ProjectileFired` is written.

use avian2d::prelude::*;
use bevy::ecs::error::BevyError;
use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState};
use super::messages::{FireRequest, ProjectileFired};
use super::pool::active_projectile_layers;
use super::weapon::{FireOutcome, Weapon};

pub fn fire_weapons(
    time: Res<Time>,
    mut requests: MessageReader<FireRequest>,
    mut fired: MessageWriter<ProjectileFired>,
    mut q_weapons: Query<&mut Weapon>,
    mut q_projectiles: Query<
        (
            &mut ProjectileState,
            &mut Projectile,
            &mut Transform,
            &mut LinearVelocity,
            &mut GravityScale,
            &mut Visibility,
            &mut CollisionLayers,
        ),
        With<PooledProjectile>,
    >,
) -> Result<(), BevyError> {
    let now = time.elapsed();

    for req in requests.read() {
        let Ok(mut weapon) = q_weapons.get_mut(req.weapon) else {
            debug!("fire request for missing weapon {:?}", req.weapon);
            continue;
        };

        let projectile = match weapon.fire(now) {
            FireOutcome::Fired { projectile, .. } => projectile,
            FireOutcome::Cooldown => {
                debug!("weapon {:?}: cooling down", req.weapon);
                continue;
            }
            FireOutcome::Exhausted => {
                debug!(
                    "weapon {:?}: pool exhausted ({} slots)",
                    req.weapon,
                    weapon.pool.capacity()
                );
                continue;
            }
        };

        let (mut state, mut data, mut tf, mut vel, mut gravity, mut vis, mut layers) =
            q_projectiles.get_mut(projectile)?;

        *state = ProjectileState::Active;
        data.reset_for_fire(req.origin);
        tf.translation = req.origin.extend(tf.translation.z);
        tf.scale.x = req.direction.signum();
        vel.0 = req.velocity;
        gravity.0 = 1.0;
        *vis = Visibility::Visible;
        *layers = active_projectile_layers();

        fired.write(ProjectileFired {
            weapon: req.weapon,
            projectile,
        });
    }

    Ok(())
}
