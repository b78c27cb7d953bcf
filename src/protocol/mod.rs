//! Farm monitoring wire protocol.
//!
//! Outbound, every message is a `{`-opened run of `[KEY:value]` tokens
//! closed by `}` and a newline:
//!
//! ```text
//! {[PRN:1][PFN:0][DIA:400]}
//! {[ERR:1][PFN:0]}
//! ```
//!
//! Inbound, the host sends plain text lines (`PRUSA Ping`, `PRUSA PRN`,
//! `PRUSA thx`), assembled from the serial byte stream by
//! [`line::LineDecoder`].
//!
//! The token layout is bit-exact with the monitoring host and must not be
//! reordered.

pub mod encoder;
pub mod frame;
pub mod line;
pub mod snapshot;
