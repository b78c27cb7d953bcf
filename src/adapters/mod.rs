//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements        | Connects to                    |
//! |--------------|-------------------|--------------------------------|
//! | `display`    | DisplayPort       | Log output (LCD stand-in)      |
//! | `line_queue` | CommandQueuePort  | Bounded ring + dispatch hook   |
//! | `nvs`        | StoragePort       | NVS / in-memory store          |
//! | `serial`     | WirePort          | Any `std::io::Write` (UART)    |
//! | `time`       | ClockPort         | ESP32 system timer / `Instant` |
//!
//! `MachinePort` has no adapter here: the printer's job and heater state
//! belong to the host firmware, which implements it directly.

pub mod display;
pub mod line_queue;
pub mod nvs;
pub mod serial;
pub mod time;
