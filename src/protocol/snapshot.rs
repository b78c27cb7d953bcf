//! Point-in-time machine readings consumed by the status encoder.
//!
//! The encoder never reads live hardware; the service asks the
//! [`MachinePort`](crate::app::ports::MachinePort) for one of these per
//! emitted event and passes it down by reference.

use heapless::String;

/// Maximum stored file name length (long file names included).
pub const FILENAME_CAPACITY: usize = 64;

/// Maximum firmware version string length.
pub const VERSION_CAPACITY: usize = 24;

/// Job flags that select the status number of the default event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobState {
    /// Firmware is blocked waiting for the operator.
    pub paused_for_user: bool,
    /// Print paused from the menu or by `M601`.
    pub paused: bool,
    /// A job is streaming from the SD card.
    pub sd_printing: bool,
    /// Filament load in progress.
    pub loading_filament: bool,
}

impl JobState {
    /// Either a print or a filament load is running.
    pub fn is_busy(&self) -> bool {
        self.sd_printing || self.loading_filament
    }
}

/// A point-in-time snapshot of everything a farm frame can report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineSnapshot {
    pub job: JobState,

    /// Hotend target (°C, whole degrees).
    pub hotend_target_c: i16,
    /// Bed target (°C, whole degrees).
    pub bed_target_c: i16,
    /// Hotend measured temperature (°C).
    pub hotend_c: f32,
    /// Bed measured temperature (°C).
    pub bed_c: f32,

    /// Total filament used over the printer's lifetime.
    pub total_filament_used: u32,
    /// Job progress, 0–100.
    pub percent_done: u8,
    /// Feed-rate multiplier in percent.
    pub feed_multiplier: u16,

    /// 8.3 file name of the current job.
    pub filename: String<FILENAME_CAPACITY>,
    /// Long file name, empty when the card has none.
    pub long_filename: String<FILENAME_CAPACITY>,

    /// Seconds since the job started; `None` when no job was started.
    pub job_elapsed_secs: Option<u32>,

    pub firmware_version: String<VERSION_CAPACITY>,
    /// Nozzle diameter in micrometres.
    pub nozzle_diameter_um: u16,
}

impl MachineSnapshot {
    /// Long file name when present, otherwise the 8.3 name.
    pub fn display_filename(&self) -> &str {
        if self.long_filename.is_empty() {
            &self.filename
        } else {
            &self.long_filename
        }
    }
}

/// Copy `text` into a fixed-capacity string, truncating on a char boundary.
pub fn bounded<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
