//! Farm service: the hexagonal core.
//!
//! [`FarmService`] owns the mode store, heartbeat, liveness supervisor and
//! handshake.  It exposes a hardware-agnostic API driven by three hooks
//! from the host firmware:
//!
//! ```text
//!  status-screen tick ──▶ ┌──────────────────────────────┐ ──▶ WirePort
//!         UI tick ──────▶ │          FarmService          │
//!  queued host lines ───▶ │ State · Heartbeat · Liveness  │ ◀── MachinePort
//!                         │        · Handshake            │ ──▶ DisplayPort
//!                         └──────────────────────────────┘ ◀─▶ StoragePort
//! ```
//!
//! All I/O flows through port traits passed in at each call, so the whole
//! service runs against mock adapters in tests.

use log::{debug, info, warn};

use crate::config::{ERASED_BYTE, FarmConfig, SILENT_MODE_OFF, storage_keys};
use crate::handshake::{
    ConfirmPrompt, ConfirmedBy, Handshake, PROGRESS_GLYPH, PROGRESS_ROW, PROMPT_LINES,
    ProgressDraw, PromptStatus,
};
use crate::liveness::{Connectivity, LivenessSupervisor};
use crate::protocol::encoder::encode;
use crate::scheduler::Heartbeat;

use super::commands::{HostCommand, ModeCommand};
use super::events::FarmEvent;
use super::ports::{ClockPort, DisplayPort, FarmHardware, MachinePort, StoragePort, WirePort};
use super::state::FarmState;

/// Blank line covering the full progress row.
const BLANK_ROW: &str = "                    ";

// ───────────────────────────────────────────────────────────────
// FarmService
// ───────────────────────────────────────────────────────────────

pub struct FarmService {
    config: FarmConfig,
    state: FarmState,
    heartbeat: Heartbeat,
    liveness: LivenessSupervisor,
    handshake: Handshake,
    prompt: ConfirmPrompt,
    frames_dropped: u32,
}

impl FarmService {
    /// Construct an inactive service.  Call [`init`](Self::init) at boot.
    ///
    /// A config that fails validation is replaced by the defaults.
    pub fn new(config: FarmConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("Rejected farm config ({}), using defaults", e);
                FarmConfig::default()
            }
        };
        Self {
            heartbeat: Heartbeat::new(&config),
            liveness: LivenessSupervisor::new(&config),
            handshake: Handshake::new(&config),
            prompt: ConfirmPrompt::from_config(&config),
            state: FarmState::new(),
            config,
            frames_dropped: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Restore farm mode from storage.
    ///
    /// An erased or missing mode byte is normalised to "off" and written
    /// back.  A set byte re-enters farm mode and starts the handshake.
    pub fn init(&mut self, store: &mut impl StoragePort, hw: &mut impl FarmHardware) {
        let stored = store.read_byte(storage_keys::FARM_MODE).unwrap_or_else(|e| {
            warn!("Farm mode read failed: {}", e);
            None
        });

        match stored {
            None | Some(ERASED_BYTE) => {
                persist(store, storage_keys::FARM_MODE, 0);
                info!("Farm mode off (fresh storage)");
            }
            Some(0) => info!("Farm mode off"),
            Some(_) => {
                self.state.activate();
                hw.open_host_serial();
                self.begin_handshake(hw);
                hw.set_filament_autoload(false);
                persist(store, storage_keys::FAN_CHECK, 1);
                info!("Farm mode restored, awaiting host confirmation");
            }
        }
    }

    // ── Outbound ──────────────────────────────────────────────

    /// Encode `event` and write it to the host.  No-op while inactive.
    pub fn emit(&mut self, event: FarmEvent, hw: &mut (impl WirePort + MachinePort)) {
        if !self.state.is_active() {
            return;
        }

        let snap = hw.snapshot();
        match encode(event, &snap, self.state.last_status()) {
            Ok(encoded) => {
                if let Some(status) = encoded.status {
                    self.state.record_status(status);
                }
                if let Some(ticks) = encoded.heartbeat_reload {
                    self.heartbeat.reload(ticks);
                }
                debug!("farm {:?}: {}", event, encoded.frame.as_str().trim_end());
                hw.write_str(encoded.frame.as_str());
            }
            Err(e) => {
                self.frames_dropped = self.frames_dropped.saturating_add(1);
                warn!("Dropped {:?} frame: {}", event, e);
            }
        }
    }

    // ── Per-tick hooks ────────────────────────────────────────

    /// Status-screen refresh hook: drives the heartbeat.
    pub fn on_status_screen_tick(&mut self, hw: &mut (impl WirePort + MachinePort)) {
        if !self.state.is_active() {
            return;
        }

        let slots = self.heartbeat.tick();
        if !slots.any() {
            return;
        }

        let job = hw.job();
        if slots.status {
            self.emit(FarmEvent::Default, hw);
        }
        if slots.temperatures {
            self.emit(FarmEvent::Temperatures, hw);
            if job.loading_filament {
                self.emit(FarmEvent::FilamentWait, hw);
            }
        }
        if slots.progress && job.sd_printing {
            self.emit(FarmEvent::StatusEcho, hw);
        }
    }

    /// UI refresh hook: liveness evaluation and handshake re-announce.
    ///
    /// Blocks in the connection prompt when a handshake is pending and the
    /// host has gone silent.  Returns how the prompt was resolved, if it
    /// ran.
    pub fn on_ui_tick(
        &mut self,
        store: &mut impl StoragePort,
        hw: &mut impl FarmHardware,
    ) -> Option<ConfirmedBy> {
        if !self.state.is_active() {
            return None;
        }

        let now = hw.now_ms();
        let connectivity = self.liveness.evaluate(now, hw.is_empty());

        if !self.state.is_awaiting_ack() {
            return None;
        }
        if self.handshake.reannounce_due(now) {
            self.emit(self.state.pending_ack(), hw);
        }
        if connectivity == Connectivity::SuspectedDisconnected {
            return self.run_fallback(store, hw);
        }
        None
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Claim a host token.  Returns `false` (with no side effects) for
    /// anything the farm layer does not own.
    pub fn try_handle(&mut self, line: &str, hw: &mut (impl WirePort + ClockPort)) -> bool {
        if !self.state.is_active() {
            return false;
        }
        let Some(cmd) = HostCommand::parse(line) else {
            return false;
        };

        match cmd {
            HostCommand::Ping => self.liveness.refresh(hw.now_ms()),
            HostCommand::StatusQuery => {
                let mut digits: heapless::String<3> = heapless::String::new();
                let status = self.state.last_status();
                if core::fmt::write(&mut digits, format_args!("{status}")).is_ok() {
                    hw.write_str(&digits);
                }
            }
            HostCommand::Ack => {
                if self.state.acknowledge() {
                    self.handshake.stop();
                    info!("Host confirmed connection");
                }
            }
        }
        true
    }

    /// Pop and process one queued host line.  Returns `false` when the
    /// queue was empty.
    pub fn drain_one(&mut self, store: &mut impl StoragePort, hw: &mut impl FarmHardware) -> bool {
        let Some(line) = hw.pop_front() else {
            return false;
        };

        if let Some(cmd) = ModeCommand::parse(&line) {
            self.handle_mode_command(cmd, store, hw);
        } else if !self.try_handle(&line, hw) {
            hw.dispatch(&line);
        }
        true
    }

    // ── Mode switching ────────────────────────────────────────

    pub fn handle_mode_command(
        &mut self,
        cmd: ModeCommand,
        store: &mut impl StoragePort,
        hw: &mut impl FarmHardware,
    ) {
        match cmd {
            ModeCommand::Activate => self.activate(store, hw),
            ModeCommand::Deactivate => self.deactivate(store, hw),
        }
    }

    /// `G98`: enter farm mode.
    pub fn activate(&mut self, store: &mut impl StoragePort, hw: &mut impl FarmHardware) {
        let was_inactive = self.state.activate();
        self.liveness.refresh(hw.now_ms());
        persist(store, storage_keys::FARM_MODE, 1);

        persist(store, storage_keys::SILENT_MODE, SILENT_MODE_OFF);
        hw.reset_silent_mode();

        if was_inactive {
            self.begin_handshake(hw);
            persist(store, storage_keys::FAN_CHECK, 1);
            hw.set_filament_autoload(false);
            info!("Farm mode on, awaiting host confirmation");
        }
        hw.init_fan_check();
    }

    /// `G99`: leave farm mode.  Safe to repeat.
    pub fn deactivate(&mut self, store: &mut impl StoragePort, hw: &mut impl FarmHardware) {
        let was_active = self.state.is_active();
        self.disable(store);
        self.liveness.force_connected();
        hw.request_redraw();
        hw.init_fan_check();
        if was_active {
            info!("Farm mode off");
        }
    }

    /// Clear and persist the mode without touching the rest of the
    /// machine.
    pub fn disable(&mut self, store: &mut impl StoragePort) {
        self.state.deactivate();
        self.handshake.stop();
        persist(store, storage_keys::FARM_MODE, 0);
    }

    // ── Connection prompt ─────────────────────────────────────

    /// Block in the connection prompt until the host acknowledges, the
    /// operator long-presses, or farm mode is switched off.
    pub fn run_fallback(
        &mut self,
        store: &mut impl StoragePort,
        hw: &mut impl FarmHardware,
    ) -> Option<ConfirmedBy> {
        warn!("Host silent with handshake pending, prompting operator");
        self.begin_fallback(hw);

        let outcome = loop {
            match self.fallback_step(store, hw) {
                PromptStatus::Waiting => continue,
                PromptStatus::Confirmed(by) => break Some(by),
                PromptStatus::Abandoned => break None,
            }
        };

        self.end_fallback(hw);
        match outcome {
            Some(by) => info!("Connection confirmed by {:?}", by),
            None => info!("Connection prompt abandoned"),
        }
        outcome
    }

    /// Take over the display and draw the prompt.
    pub fn begin_fallback(&mut self, hw: &mut impl DisplayPort) {
        self.prompt.reset();
        hw.set_update_enabled(false);
        hw.clear();
        for (row, text) in (0u8..).zip(PROMPT_LINES) {
            hw.print_at(0, row, text);
        }
    }

    /// One prompt period: wait, drain one command, re-announce, sample
    /// the button.
    pub fn fallback_step(
        &mut self,
        store: &mut impl StoragePort,
        hw: &mut impl FarmHardware,
    ) -> PromptStatus {
        hw.delay_keep_alive(self.config.prompt_step_ms);
        self.drain_one(store, hw);

        if !self.state.is_active() {
            return PromptStatus::Abandoned;
        }
        if !self.state.is_awaiting_ack() {
            return PromptStatus::Confirmed(ConfirmedBy::HostAck);
        }

        let step = self.prompt.step(hw.is_pressed());
        if step.announce {
            self.emit(self.state.pending_ack(), hw);
        }
        match step.progress {
            Some(ProgressDraw::Clear) => hw.print_at(0, PROGRESS_ROW, BLANK_ROW),
            Some(ProgressDraw::Block(col)) => hw.print_at(col, PROGRESS_ROW, PROGRESS_GLYPH),
            None => {}
        }

        if step.confirmed {
            self.state.acknowledge();
            self.handshake.stop();
            return PromptStatus::Confirmed(ConfirmedBy::LongPress);
        }
        PromptStatus::Waiting
    }

    /// Hand the display back to the menu.
    pub fn end_fallback(&mut self, hw: &mut impl DisplayPort) {
        hw.set_update_enabled(true);
        hw.request_redraw();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn state(&self) -> &FarmState {
        &self.state
    }

    pub fn liveness(&self) -> &LivenessSupervisor {
        &self.liveness
    }

    pub fn heartbeat(&self) -> &Heartbeat {
        &self.heartbeat
    }

    pub fn config(&self) -> &FarmConfig {
        &self.config
    }

    /// Frames dropped on encoder overflow since boot.
    pub fn frames_dropped(&self) -> u32 {
        self.frames_dropped
    }

    // ── Internal ──────────────────────────────────────────────

    fn begin_handshake(&mut self, hw: &mut (impl WirePort + MachinePort + ClockPort)) {
        self.state.await_ack(FarmEvent::PrinterStarted);
        self.handshake.begin(hw.now_ms());
        self.emit(FarmEvent::PrinterStarted, hw);
    }
}

/// Write a mode byte, logging failures.  The in-memory state stays
/// authoritative for the session.
fn persist(store: &mut impl StoragePort, key: &str, value: u8) {
    if let Err(e) = store.update_byte(key, value) {
        warn!("Failed to persist {}={}: {}", key, value, e);
    }
}
