//! Status encoder: one recipe per [`FarmEvent`].
//!
//! | Event                       | Tokens                                          |
//! |-----------------------------|-------------------------------------------------|
//! | Default (idle)              | PRN:1, PFN, DIA                                 |
//! | Default (busy/paused)       | PRN:4/14/15, PFN, info block                    |
//! | Heating                     | PRN:2, PFN                                      |
//! | HeatingDone                 | PRN:3, PFN `}` then PRN:4 or 3, PFN             |
//! | FilamentChange              | PRN:5, PFN, **left open**                      |
//! | PrintSucceeded / Failed     | RES, FIL, PRN:last, PFN                         |
//! | PrintFinished/Stopped/Started | PRN:8/9/0, PFN                                |
//! | StatusEcho                  | PRN:last, PFN                                   |
//! | Temperatures                | ST0, STB, AT0, ATB, PFN, PRN:last               |
//! | FilamentWait                | PRN:5, PFN                                      |
//! | Error classes               | ERR:d, PFN                                      |
//! | Heartbeat                   | PRN:99, ST0, STB, AT0, ATB, PFN                 |
//!
//! Encoding is a pure function of the event, the snapshot and the last
//! announced status.  The side effects a recipe implies (a new last status,
//! a heartbeat reload) are returned in [`Encoded`] for the service to apply.

use super::frame::{Frame, FrameWriter, Termination};
use super::snapshot::MachineSnapshot;
use crate::app::events::FarmEvent;
use crate::error::WireError;

// Status numbers understood by the monitoring host.
pub const STATUS_PRINTER_STARTED: u8 = 0;
pub const STATUS_IDLE: u8 = 1;
pub const STATUS_HEATING: u8 = 2;
pub const STATUS_HEATING_DONE: u8 = 3;
pub const STATUS_PRINTING: u8 = 4;
pub const STATUS_FILAMENT_WAIT: u8 = 5;
pub const STATUS_PRINT_FINISHED: u8 = 8;
pub const STATUS_PRINT_STOPPED: u8 = 9;
pub const STATUS_PAUSED: u8 = 14;
pub const STATUS_PAUSED_FOR_USER: u8 = 15;
pub const STATUS_HEARTBEAT: u8 = 99;

/// Result of one encoder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub frame: Frame,
    /// New value for the last announced status, if the recipe sets one.
    pub status: Option<u8>,
    /// Heartbeat countdown reload, if the recipe reschedules it.
    pub heartbeat_reload: Option<u8>,
}

/// Encode `event` against `snap`.
///
/// `last_status` is echoed by the recipes that report the previously
/// announced status (print results, status echo, temperatures).
pub fn encode(
    event: FarmEvent,
    snap: &MachineSnapshot,
    last_status: u8,
) -> Result<Encoded, WireError> {
    let mut w = FrameWriter::new();
    let mut status = None;
    let mut reload = None;

    match event {
        FarmEvent::Default => {
            status = default_status(&mut w, snap)?;
        }
        FarmEvent::Heating => {
            fixed_status(&mut w, STATUS_HEATING)?;
            status = Some(STATUS_HEATING);
            reload = Some(1);
        }
        FarmEvent::HeatingDone => {
            fixed_status(&mut w, STATUS_HEATING_DONE)?;
            w.close()?;
            let next = if snap.job.is_busy() {
                STATUS_PRINTING
            } else {
                STATUS_HEATING_DONE
            };
            fixed_status(&mut w, next)?;
            status = Some(next);
            reload = Some(1);
        }
        FarmEvent::FilamentChange => {
            fixed_status(&mut w, STATUS_FILAMENT_WAIT)?;
            return Ok(Encoded {
                frame: w.finish(Termination::Open),
                status: Some(STATUS_FILAMENT_WAIT),
                heartbeat_reload: None,
            });
        }
        FarmEvent::PrintSucceeded | FarmEvent::PrintFailed => {
            w.open()?;
            w.result(event == FarmEvent::PrintSucceeded)?;
            w.printer_status(last_status)?;
            w.farm_number()?;
            reload = Some(2);
        }
        FarmEvent::PrintFinished | FarmEvent::PrintStopped | FarmEvent::PrinterStarted => {
            let code = match event {
                FarmEvent::PrintFinished => STATUS_PRINT_FINISHED,
                FarmEvent::PrintStopped => STATUS_PRINT_STOPPED,
                _ => STATUS_PRINTER_STARTED,
            };
            fixed_status(&mut w, code)?;
            status = Some(code);
            reload = Some(2);
        }
        FarmEvent::StatusEcho => {
            fixed_status(&mut w, last_status)?;
            reload = Some(4);
        }
        FarmEvent::Temperatures => {
            w.open()?;
            w.temperatures(snap)?;
            w.farm_number()?;
            w.printer_status(last_status)?;
        }
        FarmEvent::FilamentWait => {
            fixed_status(&mut w, STATUS_FILAMENT_WAIT)?;
            status = Some(STATUS_FILAMENT_WAIT);
        }
        FarmEvent::ThermalRunaway
        | FarmEvent::ThermalRunawayPreheat
        | FarmEvent::MinTemp
        | FarmEvent::MaxTemp => {
            w.open()?;
            if let Some(digit) = event.error_digit() {
                w.error(digit)?;
            }
            w.farm_number()?;
        }
        FarmEvent::Heartbeat => {
            w.open()?;
            w.printer_status(STATUS_HEARTBEAT)?;
            w.temperatures(snap)?;
            w.farm_number()?;
        }
    }

    w.close()?;
    Ok(Encoded {
        frame: w.finish(Termination::Closed),
        status,
        heartbeat_reload: reload,
    })
}

/// `{[PRN:code][PFN:0]`
fn fixed_status(w: &mut FrameWriter, code: u8) -> Result<(), WireError> {
    w.open()?;
    w.printer_status(code)?;
    w.farm_number()
}

/// Busy and paused states carry the job info block and leave the last
/// status untouched; only the idle branch records a new status.
fn default_status(w: &mut FrameWriter, snap: &MachineSnapshot) -> Result<Option<u8>, WireError> {
    let busy_code = if snap.job.paused_for_user {
        Some(STATUS_PAUSED_FOR_USER)
    } else if snap.job.paused {
        Some(STATUS_PAUSED)
    } else if snap.job.is_busy() {
        Some(STATUS_PRINTING)
    } else {
        None
    };

    match busy_code {
        Some(code) => {
            fixed_status(w, code)?;
            w.print_info(snap)?;
            Ok(None)
        }
        None => {
            fixed_status(w, STATUS_IDLE)?;
            w.diameter(snap)?;
            Ok(Some(STATUS_IDLE))
        }
    }
}
