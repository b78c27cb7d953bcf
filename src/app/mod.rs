//! Application core: pure farm-mode logic, zero I/O.
//!
//! This module holds the mode store, the event catalogue, inbound command
//! recognition and the [`service::FarmService`] that ties the encoder,
//! heartbeat, liveness supervisor and handshake together.  All interaction
//! with the printer happens through the **port traits** in [`ports`].

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod state;
