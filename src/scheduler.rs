//! Heartbeat scheduler.
//!
//! A single countdown staggers the periodic telemetry so one status tick
//! never carries more than a couple of frames:
//!
//! ```text
//!  remaining: 10  9  8  7  6  5  4  3  2  1 │ 10 ...
//!                    │        │             │
//!                    │        │             └─ floor reached: reload, default status
//!                    │        └─ progress slot: status echo (only while printing)
//!                    └─ temperature slot: temperatures (+ filament wait while loading)
//! ```
//!
//! Discrete events may pull the countdown forward through
//! [`Heartbeat::reload`] so the next full status follows them closely.

use crate::config::FarmConfig;

/// Which periodic pushes are due on this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartbeatSlots {
    /// Full default status.
    pub status: bool,
    /// Temperature snapshot.
    pub temperatures: bool,
    /// Progress echo.
    pub progress: bool,
}

impl HeartbeatSlots {
    pub fn any(&self) -> bool {
        self.status || self.temperatures || self.progress
    }
}

/// Countdown driving the periodic telemetry cadence.
///
/// Invariant: `remaining` is always within `[0, period]`.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    remaining: u8,
    period: u8,
    temperature_slot: u8,
    progress_slot: u8,
}

impl Heartbeat {
    pub fn new(config: &FarmConfig) -> Self {
        let period = config.heartbeat_period_ticks.max(1);
        Self {
            remaining: config.heartbeat_initial_ticks.min(period),
            period,
            temperature_slot: config.temperature_slot,
            progress_slot: config.progress_slot,
        }
    }

    /// Advance one status tick.
    pub fn tick(&mut self) -> HeartbeatSlots {
        let mut slots = HeartbeatSlots::default();

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining < 1 {
            self.remaining = self.period;
            slots.status = true;
        }

        slots.temperatures = self.remaining == self.temperature_slot;
        slots.progress = self.remaining == self.progress_slot;
        slots
    }

    /// Move the countdown, clamped into `[0, period]`.
    pub fn reload(&mut self, ticks: u8) {
        self.remaining = ticks.min(self.period);
    }

    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    pub fn period(&self) -> u8 {
        self.period
    }
}
