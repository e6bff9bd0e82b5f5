//! Projectiles plugin: rate-limited weapons backed by fixed-capacity pools.
//!
//! # Data flow
//! ```text
//!   FixedUpdate
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (A) Producers (actor drivers, BodySystems::Drive)                         │
//!│      - write: FireRequest { weapon, origin, direction, velocity }          │
//!│                                                                            │
//!│  (B) Consumer: fire_weapons (BodySystems::Emit)                            │
//!│      - Weapon::fire: CooldownGate -> ProjectilePool::acquire               │
//!│      - Fired: place + launch projectile, write ProjectileFired             │
//!│      - Cooldown / Exhausted: counted on the weapon, nothing emitted        │
//!│                                                                            │
//!│  (C) expire_projectiles: lifetime / travel distance -> PendingReturn       │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   FixedPostUpdate
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (D) Avian writes CollisionStart messages                                  │
//!│  (E) process_projectile_collisions: hit -> ProjectileHit + PendingReturn   │
//!│  (F) return_to_pool_commit: PendingReturn -> Inactive, pool slot released  │
//!└────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The allocator is the only system that reserves slots and the commit is the only one that
//! releases them. Both run on the single-threaded fixed loop, in order.

pub mod allocator;
pub mod collision;
pub mod commit;
pub mod components;
pub mod cooldown;
pub mod lifetime;
pub mod messages;
pub mod pool;
pub mod weapon;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::physics::BodySystems;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<messages::FireRequest>()
            .add_message::<messages::ProjectileFired>()
            .add_message::<messages::ProjectileHit>();

        app.add_systems(
            FixedUpdate,
            (allocator::fire_weapons, lifetime::expire_projectiles)
                .chain()
                .in_set(BodySystems::Emit)
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            FixedPostUpdate,
            (
                collision::process_projectile_collisions,
                commit::return_to_pool_commit,
            )
                .chain()
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        );
    }
}
