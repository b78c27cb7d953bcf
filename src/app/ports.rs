//! Port traits: the hexagonal boundary between the farm layer and the
//! rest of the printer firmware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FarmService (domain)
//! ```
//!
//! G-code dispatch, job state, heaters, the LCD and persistent storage all
//! live outside this crate.  The [`FarmService`](super::service::FarmService)
//! reaches them only through these traits, consumed via generics, so the
//! whole supervision engine runs on the host against mock adapters.

use crate::error::StorageError;
use crate::protocol::line::HostLine;
use crate::protocol::snapshot::{JobState, MachineSnapshot};

// ───────────────────────────────────────────────────────────────
// Wire port (domain → monitoring host)
// ───────────────────────────────────────────────────────────────

/// Outbound serial text.  Implementations write the bytes verbatim;
/// frames already carry their own terminators.
pub trait WirePort {
    fn write_str(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Machine port (printer state readers and mode side effects)
// ───────────────────────────────────────────────────────────────

pub trait MachinePort {
    /// Read every value the status encoder may need.
    fn snapshot(&mut self) -> MachineSnapshot;

    /// Job flags only; used on the hot tick path.
    fn job(&mut self) -> JobState {
        self.snapshot().job
    }

    /// Re-run the fan-safety check initialisation.
    fn init_fan_check(&mut self);

    /// Enable or disable automatic filament loading.
    fn set_filament_autoload(&mut self, enabled: bool);

    /// Drop the in-memory silent-mode preference back to "off".
    fn reset_silent_mode(&mut self);

    /// Route serial I/O to the port the monitoring host is attached to.
    fn open_host_serial(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Command queue port (pending host work)
// ───────────────────────────────────────────────────────────────

/// The controller's buffered command queue.
///
/// The farm layer never runs the G-code interpreter itself: it pops a line,
/// offers it to its own intercept, and hands anything unclaimed back via
/// [`dispatch`](Self::dispatch).  This keeps every call into the service
/// non-reentrant.
pub trait CommandQueuePort {
    fn is_empty(&self) -> bool;

    /// Remove and return the oldest queued line.
    fn pop_front(&mut self) -> Option<HostLine>;

    /// Execute a line through the regular command dispatcher.
    fn dispatch(&mut self, line: &str);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Monotonic milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Sleep for `ms` while keeping heaters, watchdog and serial RX serviced.
    fn delay_keep_alive(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Button port
// ───────────────────────────────────────────────────────────────

/// The physical confirmation input (the encoder knob push button).
pub trait ButtonPort {
    /// `true` while the button is held down.
    fn is_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Character LCD primitives needed for the connection prompt.
pub trait DisplayPort {
    /// Suspend or resume the regular menu redraw loop.
    fn set_update_enabled(&mut self, enabled: bool);

    fn clear(&mut self);

    /// Write `text` starting at `(col, row)`.
    fn print_at(&mut self, col: u8, row: u8, text: &str);

    /// Ask the menu subsystem to repaint the current screen in full.
    fn request_redraw(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Storage port (EEPROM / NVS)
// ───────────────────────────────────────────────────────────────

/// Key-addressed persistent storage.
///
/// Writes MUST be atomic per key.  Keys are short static names, see
/// [`crate::config::storage_keys`].
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, key: &str) -> bool;

    /// Single-byte read.  `Ok(None)` when the key was never written.
    fn read_byte(&self, key: &str) -> Result<Option<u8>, StorageError> {
        let mut buf = [0u8; 1];
        match self.read(key, &mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(_) | Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write a byte only if it differs from the stored value, sparing
    /// flash wear on the frequent mode writes.
    fn update_byte(&mut self, key: &str, value: u8) -> Result<(), StorageError> {
        if self.read_byte(key)? == Some(value) {
            return Ok(());
        }
        self.write(key, &[value])
    }
}

// ───────────────────────────────────────────────────────────────
// Aggregate
// ───────────────────────────────────────────────────────────────

/// Everything the service touches except storage.
///
/// The handshake fallback needs the wire, the queue, the clock, the button
/// and the display at once; bundling them avoids juggling six mutable
/// borrows at each call site.
pub trait FarmHardware:
    WirePort + MachinePort + CommandQueuePort + ClockPort + ButtonPort + DisplayPort
{
}

impl<T> FarmHardware for T where
    T: WirePort + MachinePort + CommandQueuePort + ClockPort + ButtonPort + DisplayPort
{
}
