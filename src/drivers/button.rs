//! Polled confirmation button driver.
//!
//! ## Hardware
//!
//! Active-low momentary switch (the encoder knob push) with a pull-up.
//! The connection prompt samples it once per prompt step, so no edge
//! interrupt or debounce state machine is needed: a bounce shorter than
//! one step cannot survive 150 consecutive samples.
//!
//! Any [`embedded_hal::digital::InputPin`] works, which keeps the driver
//! testable on the host with a fake pin.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::ButtonPort;

pub struct ConfirmButton<P: InputPin> {
    pin: P,
    read_errors: u32,
}

impl<P: InputPin> ConfirmButton<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            read_errors: 0,
        }
    }

    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin> ButtonPort for ConfirmButton<P> {
    /// Low level means pressed.  A failed read counts as released so a
    /// broken input can never confirm the prompt on its own.
    fn is_pressed(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(low) => low,
            Err(e) => {
                if self.read_errors == 0 {
                    warn!("Confirm button read failed: {:?}", e);
                }
                self.read_errors = self.read_errors.saturating_add(1);
                false
            }
        }
    }
}
