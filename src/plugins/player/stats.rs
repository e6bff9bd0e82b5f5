//! Lives, health and stomach contents.

use std::time::Duration;

use bevy::time::{Timer, TimerMode};

use crate::common::tunables::Tunables;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub lives: u32,
    pub max_lives: u32,
    pub health: u32,
    pub max_health: u32,
    pub fullness: u32,
    pub max_fullness: u32,
    /// Repeats every `stomach_fill_period`; each completion refills one unit.
    stomach: Timer,
}

impl PlayerStats {
    pub fn from_tunables(t: &Tunables) -> Self {
        Self {
            lives: t.max_lives,
            max_lives: t.max_lives,
            health: t.max_health,
            max_health: t.max_health,
            fullness: t.max_fullness,
            max_fullness: t.max_fullness,
            stomach: Timer::from_seconds(t.stomach_fill_period, TimerMode::Repeating),
        }
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount.max(1)).min(self.max_health);
    }

    /// Returns the health left.
    pub fn damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    pub fn eat(&mut self, amount: u32) {
        self.fullness = self.fullness.saturating_add(amount).min(self.max_fullness);
    }

    /// Spend one unit of fullness. `false` on an empty stomach.
    pub fn spend_fullness(&mut self) -> bool {
        if self.fullness == 0 {
            return false;
        }
        self.fullness -= 1;
        true
    }

    pub fn add_life(&mut self, amount: u32) {
        self.lives = (self.lives + amount.max(1)).min(self.max_lives);
    }

    /// Returns the lives left.
    pub fn remove_life(&mut self, amount: u32) -> u32 {
        self.lives = self.lives.saturating_sub(amount.max(1));
        self.lives
    }

    pub fn remove_max_life(&mut self, amount: u32) {
        self.max_lives = self.max_lives.saturating_sub(amount.max(1));
        self.lives = self.lives.min(self.max_lives);
    }

    /// Refill one unit per elapsed fill period. Returns the units eaten.
    pub fn tick_stomach(&mut self, delta: Duration) -> u32 {
        let eaten = self.stomach.tick(delta).times_finished_this_tick();
        self.eat(eaten);
        eaten
    }

    pub fn is_out_of_lives(&self) -> bool {
        self.lives == 0
    }
}
