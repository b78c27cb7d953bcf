//! Farm mode store.
//!
//! Holds whether farm mode is active, the last status number announced to
//! the host, and the pending handshake acknowledgment.  Only the `active`
//! bit is persisted; the service mirrors it to storage.

use super::events::FarmEvent;

/// Process-wide farm state, owned by the [`FarmService`](super::service::FarmService).
///
/// Invariant: `awaiting_ack` is only ever `true` while `active` is `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmState {
    active: bool,
    last_status: u8,
    awaiting_ack: bool,
    pending_ack: FarmEvent,
}

impl Default for FarmState {
    fn default() -> Self {
        Self::new()
    }
}

impl FarmState {
    pub fn new() -> Self {
        Self {
            active: false,
            last_status: 0,
            awaiting_ack: false,
            pending_ack: FarmEvent::PrinterStarted,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_status(&self) -> u8 {
        self.last_status
    }

    pub fn is_awaiting_ack(&self) -> bool {
        self.awaiting_ack
    }

    /// Event re-announced until the host acknowledges it.
    pub fn pending_ack(&self) -> FarmEvent {
        self.pending_ack
    }

    /// Returns `true` if the mode was previously inactive.
    pub fn activate(&mut self) -> bool {
        let was_inactive = !self.active;
        self.active = true;
        was_inactive
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.awaiting_ack = false;
    }

    /// Start waiting for the host to acknowledge `status`.
    /// Ignored while inactive.
    pub fn await_ack(&mut self, status: FarmEvent) {
        if !self.active {
            return;
        }
        self.awaiting_ack = true;
        self.pending_ack = status;
    }

    /// Clear the pending acknowledgment.  Returns `true` if one was pending.
    pub fn acknowledge(&mut self) -> bool {
        core::mem::replace(&mut self.awaiting_ack, false)
    }

    pub fn record_status(&mut self, status: u8) {
        self.last_status = status;
    }
}
