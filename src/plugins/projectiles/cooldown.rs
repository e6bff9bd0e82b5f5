//! Minimum-interval rate limiter for weapon emission.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownGate {
    last_fire: Option<Duration>,
    min_interval: Duration,
}

impl CooldownGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_fire: None,
            min_interval,
        }
    }

    /// `true` iff nothing was fired yet or `now - last_fire >= min_interval`.
    #[inline]
    pub fn can_fire(&self, now: Duration) -> bool {
        match self.last_fire {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.min_interval,
        }
    }

    #[inline]
    pub fn mark_fired(&mut self, now: Duration) {
        self.last_fire = Some(now);
    }

    pub fn last_fire(&self) -> Option<Duration> {
        self.last_fire
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn reset(&mut self) {
        self.last_fire = None;
    }
}
