//! Inbound line assembler.
//!
//! The host link delivers bytes; the intercept and the command queue work
//! on whole lines.  The decoder accumulates bytes and yields a line on each
//! `\n` or `\r`.  A single serial read may hold part of a line or several
//! lines, so callers feed whatever arrived and collect zero or more lines.
//!
//! Lines longer than [`MAX_LINE_LEN`] are dropped up to the next
//! terminator rather than split: a truncated G-code is worse than none.

use heapless::String;

/// Widest command the controller's queue accepts.
pub const MAX_LINE_LEN: usize = 96;

/// One inbound host line, without its terminator.
pub type HostLine = String<MAX_LINE_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Collecting printable bytes.
    Collecting,
    /// Current line overflowed; skip to the next terminator.
    Discarding,
}

/// Streaming byte → line decoder.
pub struct LineDecoder {
    state: DecoderState,
    line: HostLine,
    dropped: u32,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Collecting,
            line: String::new(),
            dropped: 0,
        }
    }

    /// Feed one byte.  Returns a complete, non-empty line when `byte`
    /// terminates one.
    pub fn push(&mut self, byte: u8) -> Option<HostLine> {
        if byte == b'\n' || byte == b'\r' {
            let was = self.state;
            self.state = DecoderState::Collecting;
            let line = core::mem::take(&mut self.line);
            return match was {
                DecoderState::Collecting if !line.trim().is_empty() => Some(line),
                _ => None,
            };
        }

        if self.state == DecoderState::Discarding {
            return None;
        }

        // Non-ASCII bytes cannot be part of a valid command.
        let ch = if byte.is_ascii() { byte as char } else { '?' };
        if self.line.push(ch).is_err() {
            self.line.clear();
            self.state = DecoderState::Discarding;
            self.dropped = self.dropped.saturating_add(1);
            log::warn!("host line exceeds {} bytes, dropped", MAX_LINE_LEN);
        }
        None
    }

    /// Feed a chunk, handing every completed line to `on_line`.
    pub fn feed(&mut self, data: &[u8], mut on_line: impl FnMut(HostLine)) {
        for &byte in data {
            if let Some(line) = self.push(byte) {
                on_line(line);
            }
        }
    }

    /// Number of over-long lines discarded since construction.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Discard any partial line (e.g. after the link reconnects).
    pub fn reset(&mut self) {
        self.line.clear();
        self.state = DecoderState::Collecting;
    }
}
