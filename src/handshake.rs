//! Connection-confirmation handshake.
//!
//! On entering farm mode the printer announces [`FarmEvent::PrinterStarted`]
//! and keeps re-announcing it until the host answers `thx`.  If the host
//! also stops pinging, the printer blocks local interaction behind a
//! prompt until either the acknowledgment arrives or the operator holds
//! the knob long enough.
//!
//! ```text
//!  activate ──▶ Awaiting ──thx──────────────────────────▶ Confirmed(HostAck)
//!                  │ every re-announce interval: emit pending
//!                  │ host silent
//!                  ▼
//!               Prompt ──thx─────────────────────────────▶ Confirmed(HostAck)
//!                  │ knob held for the full long press
//!                  └─────────────────────────────────────▶ Confirmed(LongPress)
//! ```
//!
//! [`Handshake`] owns the re-announce timer; [`ConfirmPrompt`] is the
//! pure per-step state machine of the blocking prompt.
//!
//! [`FarmEvent::PrinterStarted`]: crate::app::events::FarmEvent::PrinterStarted

use crate::config::FarmConfig;
use crate::timer::IntervalTimer;

/// Character columns of the display.
pub const LCD_WIDTH: u8 = 20;

/// Row used for the long-press progress bar.
pub const PROGRESS_ROW: u8 = 3;

/// Prompt shown while the host is silent, one entry per display row.
pub const PROMPT_LINES: [&str; 3] = [
    "Connect printer to",
    "monitoring or hold",
    "the knob to continue",
];

/// Glyph drawn for the long-press progress bar.
pub const PROGRESS_GLYPH: &str = "\u{2588}";

/// How a pending handshake was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmedBy {
    /// The host sent `thx`.
    HostAck,
    /// The operator held the knob for the full long press.
    LongPress,
}

/// State of the blocking prompt after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStatus {
    /// Still waiting for the host or the operator.
    Waiting,
    Confirmed(ConfirmedBy),
    /// Farm mode was switched off while prompting.
    Abandoned,
}

/// Re-announce timing of a pending handshake.
pub struct Handshake {
    timer: IntervalTimer,
    period_ms: u64,
}

impl Handshake {
    pub fn new(config: &FarmConfig) -> Self {
        Self {
            timer: IntervalTimer::new(),
            period_ms: u64::from(config.reannounce_interval_secs) * 1000,
        }
    }

    /// Start (or restart) the re-announce interval.
    pub fn begin(&mut self, now_ms: u64) {
        self.timer.start(now_ms);
    }

    /// `true` when a re-announce is due.  Re-arms itself when it fires.
    pub fn reannounce_due(&mut self, now_ms: u64) -> bool {
        if self.timer.expired(now_ms, self.period_ms) {
            self.timer.start(now_ms);
            true
        } else {
            false
        }
    }

    pub fn stop(&mut self) {
        self.timer.stop();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }
}

/// Progress bar update for one prompt step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressDraw {
    /// Blank the progress row.
    Clear,
    /// Draw one block at the given column.
    Block(u8),
}

/// Outcome of one prompt step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptStep {
    /// Re-emit the pending status this step.
    pub announce: bool,
    /// Progress row update, if any.
    pub progress: Option<ProgressDraw>,
    /// The long press completed on this step.
    pub confirmed: bool,
}

/// Long-press prompt.
///
/// Invariant: confirmation needs `long_press_steps` consecutive pressed
/// steps; any released step resets the count.
#[derive(Debug, Clone)]
pub struct ConfirmPrompt {
    long_press_steps: u32,
    reannounce_steps: u32,
    steps: u32,
    held: u32,
}

impl ConfirmPrompt {
    pub fn new(long_press_steps: u32, reannounce_steps: u32) -> Self {
        Self {
            long_press_steps: long_press_steps.max(1),
            reannounce_steps: reannounce_steps.max(1),
            steps: 0,
            held: 0,
        }
    }

    pub fn from_config(config: &FarmConfig) -> Self {
        Self::new(
            config.long_press_steps(),
            u32::from(config.prompt_reannounce_steps),
        )
    }

    /// Advance one prompt period with the current button level.
    pub fn step(&mut self, pressed: bool) -> PromptStep {
        self.steps = self.steps.wrapping_add(1);
        let announce = self.steps % self.reannounce_steps == 0;

        if !pressed {
            let progress = (self.held > 0).then_some(ProgressDraw::Clear);
            self.held = 0;
            return PromptStep {
                announce,
                progress,
                confirmed: false,
            };
        }

        self.held = self.held.saturating_add(1);
        PromptStep {
            announce,
            progress: Some(ProgressDraw::Block(self.column())),
            confirmed: self.held == self.long_press_steps,
        }
    }

    /// Consecutive pressed steps so far.
    pub fn held(&self) -> u32 {
        self.held
    }

    pub fn reset(&mut self) {
        self.steps = 0;
        self.held = 0;
    }

    fn column(&self) -> u8 {
        let col = u64::from(self.held) * u64::from(LCD_WIDTH) / u64::from(self.long_press_steps);
        col.min(u64::from(LCD_WIDTH - 1)) as u8
    }
}
