//! Rate-limited weapon: a cooldown gate in front of a projectile pool.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use super::cooldown::CooldownGate;
use super::pool::{ProjectilePool, spawn_pool};
use crate::common::{state::GameState, tunables::Tunables};

/// What a fire attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Fired { slot: usize, projectile: Entity },
    /// Too soon after the last shot. Nothing was consumed.
    Cooldown,
    /// No free slot. The cooldown is consumed only under the legacy policy.
    Exhausted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeaponStats {
    pub fired: u32,
    pub cooldown: u32,
    pub exhausted: u32,
}

#[derive(Component, Debug, Clone)]
pub struct Weapon {
    pub gate: CooldownGate,
    pub pool: ProjectilePool,
    /// Start the cooldown even when the pool had no free slot.
    pub consume_on_exhaustion: bool,
    stats: WeaponStats,
}

impl Weapon {
    pub fn new(pool: ProjectilePool, min_interval: Duration, consume_on_exhaustion: bool) -> Self {
        Self {
            gate: CooldownGate::new(min_interval),
            pool,
            consume_on_exhaustion,
            stats: WeaponStats::default(),
        }
    }

    #[inline]
    pub fn can_fire(&self, now: Duration) -> bool {
        self.gate.can_fire(now)
    }

    /// Gate, then reserve the first free slot.
    ///
    /// The caller owns placing and launching the reserved projectile.
    pub fn fire(&mut self, now: Duration) -> FireOutcome {
        if !self.gate.can_fire(now) {
            self.stats.cooldown += 1;
            return FireOutcome::Cooldown;
        }

        match self.pool.acquire() {
            Some((slot, projectile)) => {
                self.gate.mark_fired(now);
                self.stats.fired += 1;
                FireOutcome::Fired { slot, projectile }
            }
            None => {
                if self.consume_on_exhaustion {
                    self.gate.mark_fired(now);
                }
                self.stats.exhausted += 1;
                FireOutcome::Exhausted
            }
        }
    }

    pub fn stats(&self) -> WeaponStats {
        self.stats
    }
}

/// Spawn a puke weapon as a child of `carrier`, offset in the carrier's local space, with its
/// full pool pre-spawned.
pub fn spawn_puker(
    commands: &mut Commands,
    carrier: Entity,
    offset: Vec2,
    tunables: &Tunables,
) -> Entity {
    let weapon = commands.spawn_empty().id();
    let pool = spawn_pool(commands, weapon, tunables);

    commands.entity(weapon).insert((
        Name::new("Puker"),
        Weapon::new(
            pool,
            tunables.puke_cooldown,
            tunables.consume_cooldown_on_exhaustion,
        ),
        Transform::from_translation(offset.extend(0.0)),
        Visibility::Inherited,
        ChildOf(carrier),
        DespawnOnExit(GameState::InGame),
    ));

    weapon
}
