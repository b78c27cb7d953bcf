//! Outbound frame buffer and token writers.
//!
//! Wire format of one closed frame:
//! ```text
//! ┌───┬──────────────┬──────────────┬─────┬─────┬────┐
//! │ { │ [KEY:value]  │ [KEY:value]  │ ... │  }  │ \n │
//! └───┴──────────────┴──────────────┴─────┴─────┴────┘
//! ```
//!
//! Keys are fixed three-letter codes.  A frame may also be left *open*
//! (no closing brace); see [`Termination`].

use core::fmt::{self, Write};

use heapless::String;

use super::snapshot::MachineSnapshot;
use crate::error::WireError;

/// Bytes reserved for one encoded call.  Sized for the largest recipe
/// (info block with a full-length long file name) plus margin.
pub const FRAME_CAPACITY: usize = 384;

/// Farm identifier reported in every frame.  The host assigns identity by
/// serial port, so the device always reports zero.
pub const FARM_ID: u8 = 0;

/// Filament slot reported with print results.
pub const FILAMENT_INDEX: u8 = 0;

const OPEN: char = '{';
const CLOSE: &str = "}\n";

/// How an encoded call leaves the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every `{` has its `}` and newline.
    Closed,
    /// The last frame was opened but not closed.  The caller owns the
    /// matching `}`; appending one here would double-close when the event
    /// is emitted as a sub-step of a longer flow.
    Open,
}

/// Text produced by one encoder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    text: String<FRAME_CAPACITY>,
    termination: Termination,
}

impl Frame {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn is_open(&self) -> bool {
        self.termination == Termination::Open
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Appends tokens to a bounded frame buffer.
#[derive(Default)]
pub(crate) struct FrameWriter {
    text: String<FRAME_CAPACITY>,
}

impl FrameWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn open(&mut self) -> Result<(), WireError> {
        self.text.push(OPEN).map_err(|_| WireError::FrameOverflow)
    }

    pub(crate) fn close(&mut self) -> Result<(), WireError> {
        self.text
            .push_str(CLOSE)
            .map_err(|_| WireError::FrameOverflow)
    }

    /// `[KEY:value]`
    pub(crate) fn token(&mut self, key: &str, value: impl fmt::Display) -> Result<(), WireError> {
        write!(self.text, "[{key}:{value}]")?;
        Ok(())
    }

    pub(crate) fn printer_status(&mut self, status: u8) -> Result<(), WireError> {
        self.token("PRN", status)
    }

    pub(crate) fn farm_number(&mut self) -> Result<(), WireError> {
        self.token("PFN", FARM_ID)
    }

    pub(crate) fn diameter(&mut self, snap: &MachineSnapshot) -> Result<(), WireError> {
        self.token("DIA", snap.nozzle_diameter_um)
    }

    pub(crate) fn error(&mut self, digit: char) -> Result<(), WireError> {
        self.token("ERR", digit)
    }

    /// `[RES:r][FIL:0]`
    pub(crate) fn result(&mut self, success: bool) -> Result<(), WireError> {
        self.token("RES", u8::from(success))?;
        self.token("FIL", FILAMENT_INDEX)
    }

    /// Targets are whole degrees; measured values carry two decimals.
    pub(crate) fn temperatures(&mut self, snap: &MachineSnapshot) -> Result<(), WireError> {
        self.token("ST0", snap.hotend_target_c)?;
        self.token("STB", snap.bed_target_c)?;
        self.token("AT0", format_args!("{:.2}", snap.hotend_c))?;
        self.token("ATB", format_args!("{:.2}", snap.bed_c))
    }

    /// Job info block, always ending with the nozzle diameter.
    pub(crate) fn print_info(&mut self, snap: &MachineSnapshot) -> Result<(), WireError> {
        self.token("TFU", snap.total_filament_used)?;
        self.token("PCD", Width3(u16::from(snap.percent_done)))?;
        self.token("FEM", Width3(snap.feed_multiplier))?;
        self.token("FNM", snap.display_filename())?;
        self.token("TIM", snap.job_elapsed_secs.unwrap_or(0))?;
        self.token("FWR", snap.firmware_version.as_str())?;
        self.diameter(snap)
    }

    pub(crate) fn finish(self, termination: Termination) -> Frame {
        Frame {
            text: self.text,
            termination,
        }
    }
}

/// Right-aligned three-column integer, clamped to 999.
struct Width3(u16);

impl fmt::Display for Width3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}", self.0.min(999))
    }
}
