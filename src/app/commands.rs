//! Inbound host commands.
//!
//! Two families reach the farm layer:
//!
//! - [`HostCommand`]: the three tokens the intercept claims while farm
//!   mode is active (`Ping`, `PRN`, `thx`).
//! - [`ModeCommand`]: the G-codes that switch farm mode on and off.
//!
//! Matching is case-sensitive and prefix based, mirroring how the
//! controller's G-code parser looks up codes.

/// Verb the monitoring host prefixes its tokens with.
const HOST_VERB: &str = "PRUSA";

/// Tokens recognised by the command intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Liveness refresh.
    Ping,
    /// Query for the last announced status number.
    StatusQuery,
    /// Acknowledgment of the pending handshake status.
    Ack,
}

impl HostCommand {
    /// Recognise a host token.  Returns `None` for anything else.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim();
        if let Some(stripped) = rest.strip_prefix(HOST_VERB) {
            rest = stripped.trim_start();
        }

        if rest.starts_with("Ping") {
            Some(Self::Ping)
        } else if rest.starts_with("PRN") {
            Some(Self::StatusQuery)
        } else if rest.starts_with("thx") {
            Some(Self::Ack)
        } else {
            None
        }
    }
}

/// Farm mode on/off switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCommand {
    /// `G98`: enter farm mode.
    Activate,
    /// `G99`: leave farm mode.
    Deactivate,
}

impl ModeCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        match words.next()? {
            "G98" => Some(Self::Activate),
            "G99" => Some(Self::Deactivate),
            _ => None,
        }
    }
}
