//! Serial wire adapter.
//!
//! Implements [`WirePort`] over any [`std::io::Write`].  On the board this
//! is the UART the monitoring host is attached to (stdout is routed there
//! by ESP-IDF); on the host it can be a `Vec<u8>` or a pseudo-terminal.

use std::io::Write;

use log::warn;

use crate::app::ports::WirePort;

pub struct IoWire<W: Write> {
    inner: W,
    write_errors: u32,
}

impl<W: Write> IoWire<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            write_errors: 0,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }
}

impl<W: Write> WirePort for IoWire<W> {
    fn write_str(&mut self, text: &str) {
        let result = self
            .inner
            .write_all(text.as_bytes())
            .and_then(|()| self.inner.flush());
        if let Err(e) = result {
            // Only the first failure is logged; the host link may be gone.
            if self.write_errors == 0 {
                warn!("Host serial write failed: {}", e);
            }
            self.write_errors = self.write_errors.saturating_add(1);
        }
    }
}
