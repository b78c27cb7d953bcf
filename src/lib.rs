//! Farmwatch: farm-mode telemetry for 3D printer controller firmware.
//!
//! Reports machine status to a fleet-monitoring host as `[KEY:value]`
//! frames over serial, checks that the host is still pinging, and blocks
//! local interaction behind a confirmation prompt when it goes silent.
//!
//! The pure-logic modules build on any target; ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod handshake;
pub mod liveness;
pub mod protocol;
pub mod scheduler;
pub mod timer;

pub mod adapters;
pub mod drivers;
