//! Farm telemetry events.
//!
//! Each variant is one discrete status the controller announces to the
//! monitoring host.  The numeric codes are the firmware's historical event
//! numbers; other firmware modules still refer to events by code, so the
//! mapping is stable and round-trips through [`FarmEvent::from_code`].

/// Discrete events the controller reports to the monitoring host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FarmEvent {
    // ── Status ────────────────────────────────────────────
    /// Periodic default status (idle, printing, paused).
    Default = 0,
    /// Heaters started.
    Heating = 1,
    /// Heaters reached target.
    HeatingDone = 2,
    /// Filament change requested.  Emits an unterminated frame.
    FilamentChange = 3,

    // ── Print outcome ─────────────────────────────────────
    PrintSucceeded = 4,
    PrintFailed = 5,
    PrintFinished = 6,
    PrintStopped = 7,
    /// Controller (re)entered farm mode.  Also the handshake status.
    PrinterStarted = 8,

    // ── Heartbeat variants ────────────────────────────────
    /// Echo of the last announced status.
    StatusEcho = 20,
    /// Temperature push.
    Temperatures = 21,
    /// Waiting for the operator to load filament.
    FilamentWait = 22,

    // ── Errors ────────────────────────────────────────────
    ThermalRunaway = 90,
    ThermalRunawayPreheat = 91,
    MinTemp = 92,
    MaxTemp = 93,

    /// Temperature heartbeat with fixed status 99.
    Heartbeat = 99,
}

impl FarmEvent {
    /// Every event, in code order.
    pub const ALL: [Self; 17] = [
        Self::Default,
        Self::Heating,
        Self::HeatingDone,
        Self::FilamentChange,
        Self::PrintSucceeded,
        Self::PrintFailed,
        Self::PrintFinished,
        Self::PrintStopped,
        Self::PrinterStarted,
        Self::StatusEcho,
        Self::Temperatures,
        Self::FilamentWait,
        Self::ThermalRunaway,
        Self::ThermalRunawayPreheat,
        Self::MinTemp,
        Self::MaxTemp,
        Self::Heartbeat,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.code() == code)
    }

    /// The `[ERR:d]` digit for the error classes.
    pub const fn error_digit(self) -> Option<char> {
        match self {
            Self::ThermalRunaway => Some('1'),
            Self::ThermalRunawayPreheat => Some('2'),
            Self::MinTemp => Some('3'),
            Self::MaxTemp => Some('4'),
            _ => None,
        }
    }
}
