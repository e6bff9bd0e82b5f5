//! Level countdown ("poop timer").
//!
//! Counts whole seconds down from `Tunables::level_seconds` while in game. Every elapsed
//! second writes a [`PoopTimerTick`]; reaching zero writes a single [`PoopTimerTimeout`].

use std::time::Duration;

use bevy::prelude::*;

use crate::common::{state::GameState, tunables::Tunables};

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoopTimerTick {
    pub seconds: u32,
    pub max_seconds: u32,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoopTimerTimeout;

/// What one `tick` produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Whole seconds counted down during this tick.
    pub ticks: u32,
    pub timed_out: bool,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PoopTimer {
    seconds: u32,
    max_seconds: u32,
    /// Repeats every second; each completion counts one second down.
    clock: Timer,
    pub paused: bool,
}

impl Default for PoopTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

impl PoopTimer {
    pub fn new(seconds: u32) -> Self {
        Self {
            seconds,
            max_seconds: seconds,
            clock: Timer::from_seconds(1.0, TimerMode::Repeating),
            paused: false,
        }
    }

    /// Restart from `seconds` and unpause.
    pub fn set(&mut self, seconds: u32) {
        *self = Self::new(seconds);
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn max_seconds(&self) -> u32 {
        self.max_seconds
    }

    pub fn is_expired(&self) -> bool {
        self.seconds == 0
    }

    /// Remaining time as `m:ss`.
    pub fn text(&self) -> String {
        format_clock(self.seconds)
    }

    pub fn tick(&mut self, delta: Duration) -> TickReport {
        let mut report = TickReport::default();
        if self.paused || self.is_expired() {
            return report;
        }

        self.clock.tick(delta);
        report.ticks = self.clock.times_finished_this_tick().min(self.seconds);
        self.seconds -= report.ticks;
        report.timed_out = report.ticks > 0 && self.seconds == 0;
        report
    }
}

pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PoopTimer>()
        .add_message::<PoopTimerTick>()
        .add_message::<PoopTimerTimeout>()
        .add_systems(OnEnter(GameState::InGame), reset_timer)
        .add_systems(
            FixedUpdate,
            tick_timer.run_if(in_state(GameState::InGame)),
        );
}

fn reset_timer(tunables: Res<Tunables>, mut timer: ResMut<PoopTimer>) {
    timer.set(tunables.level_seconds);
}

fn tick_timer(
    time: Res<Time>,
    mut timer: ResMut<PoopTimer>,
    mut ticks: MessageWriter<PoopTimerTick>,
    mut timeouts: MessageWriter<PoopTimerTimeout>,
) {
    let report = timer.tick(time.delta());
    if report.ticks == 0 {
        return;
    }

    let max_seconds = timer.max_seconds();
    let last = timer.seconds();
    for i in (0..report.ticks).rev() {
        ticks.write(PoopTimerTick {
            seconds: last + i,
            max_seconds,
        });
    }

    if report.timed_out {
        info!("countdown expired");
        timeouts.write(PoopTimerTimeout);
    }
}
