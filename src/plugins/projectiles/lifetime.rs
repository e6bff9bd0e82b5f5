//! Self-deactivation: active projectiles that outlive their travel envelope ask to return.

use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState};

pub fn expire_projectiles(
    time: Res<Time>,
    mut q: Query<(&mut Projectile, &mut ProjectileState, &Transform), With<PooledProjectile>>,
) {
    let dt = time.delta();

    for (mut projectile, mut state, tf) in &mut q {
        if *state != ProjectileState::Active {
            continue;
        }

        projectile.lifetime.tick(dt);
        if projectile.envelope_exceeded(tf.translation.truncate()) {
            *state = ProjectileState::PendingReturn;
        }
    }
}
