//! Host liveness supervisor.
//!
//! The monitoring host pings periodically.  The supervisor remembers the
//! most recent ping and, once per UI tick, decides whether the host is
//! still there:
//!
//! ```text
//!            ping / force_connected
//!        ┌──────────────────────────────┐
//!        ▼                              │
//!   ┌──────────┐  silence > threshold  ┌┴──────────────────────┐
//!   │Connected │ ────────────────────▶ │ SuspectedDisconnected │
//!   └──────────┘                       └───────────────────────┘
//! ```
//!
//! The threshold depends on the command queue: while work is queued a
//! queued ping can sit behind long moves, so the busy threshold applies.
//! Queue emptiness is sampled when the decision is made, never at ping
//! receipt.

use log::{info, warn};

use crate::config::FarmConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Connected,
    SuspectedDisconnected,
}

pub struct LivenessSupervisor {
    idle_threshold_ms: u64,
    busy_threshold_ms: u64,
    last_ping_ms: u64,
    state: Connectivity,
}

impl LivenessSupervisor {
    pub fn new(config: &FarmConfig) -> Self {
        Self {
            idle_threshold_ms: u64::from(config.ping_timeout_secs) * 1000,
            busy_threshold_ms: u64::from(config.ping_timeout_busy_secs) * 1000,
            last_ping_ms: 0,
            state: Connectivity::Connected,
        }
    }

    /// Record a ping at `now_ms`.  The timestamp never moves backwards.
    pub fn refresh(&mut self, now_ms: u64) {
        self.last_ping_ms = self.last_ping_ms.max(now_ms);
    }

    /// Recompute connectivity.
    pub fn evaluate(&mut self, now_ms: u64, queue_empty: bool) -> Connectivity {
        let threshold = if queue_empty {
            self.idle_threshold_ms
        } else {
            self.busy_threshold_ms
        };
        let silence = now_ms.saturating_sub(self.last_ping_ms);
        let next = if silence > threshold {
            Connectivity::SuspectedDisconnected
        } else {
            Connectivity::Connected
        };

        if next != self.state {
            match next {
                Connectivity::SuspectedDisconnected => {
                    warn!("Monitoring host silent for {} ms", silence)
                }
                Connectivity::Connected => info!("Monitoring host back"),
            }
            self.state = next;
        }
        next
    }

    pub fn state(&self) -> Connectivity {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == Connectivity::Connected
    }

    /// Mark the host as present without touching the ping timestamp.
    pub fn force_connected(&mut self) {
        self.state = Connectivity::Connected;
    }

    pub fn last_ping_ms(&self) -> u64 {
        self.last_ping_ms
    }
}
