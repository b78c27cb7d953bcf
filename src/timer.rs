//! One-shot millisecond interval timer.
//!
//! Mirrors the controller's `ShortTimer`: a stopped timer never expires,
//! and an expired timer stops itself until restarted.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalTimer {
    started_ms: Option<u64>,
}

impl IntervalTimer {
    pub const fn new() -> Self {
        Self { started_ms: None }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.started_ms = Some(now_ms);
    }

    pub fn stop(&mut self) {
        self.started_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_ms.is_some()
    }

    /// `true` once `period_ms` has elapsed since [`start`](Self::start).
    /// Stops the timer when it fires.
    pub fn expired(&mut self, now_ms: u64, period_ms: u64) -> bool {
        let Some(started) = self.started_ms else {
            return false;
        };
        if now_ms.saturating_sub(started) >= period_ms {
            self.started_ms = None;
            true
        } else {
            false
        }
    }
}
