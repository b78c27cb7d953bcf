//! Log-backed character display.
//!
//! Implements [`DisplayPort`] for boards without an LCD: the 20x4 frame
//! buffer is mirrored in memory and every change is written to the logger
//! (UART / USB-CDC in production).  The LCD driver of a real controller
//! implements the same trait.

use log::{debug, info};

use crate::app::ports::DisplayPort;
use crate::handshake::LCD_WIDTH;

pub const LCD_ROWS: usize = 4;

const COLS: usize = LCD_WIDTH as usize;

/// Stand-in for glyphs outside the character ROM.
const UNKNOWN_GLYPH: u8 = b'#';

pub struct LogDisplay {
    rows: [[u8; COLS]; LCD_ROWS],
    update_enabled: bool,
    redraws: u32,
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            rows: [[b' '; COLS]; LCD_ROWS],
            update_enabled: true,
            redraws: 0,
        }
    }

    /// Current contents of `row`, trailing blanks included.
    pub fn row(&self, row: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| core::str::from_utf8(r).ok())
            .unwrap_or("")
    }

    pub fn is_update_enabled(&self) -> bool {
        self.update_enabled
    }

    /// Redraw requests seen so far.
    pub fn redraws(&self) -> u32 {
        self.redraws
    }
}

impl DisplayPort for LogDisplay {
    fn set_update_enabled(&mut self, enabled: bool) {
        self.update_enabled = enabled;
    }

    fn clear(&mut self) {
        self.rows = [[b' '; COLS]; LCD_ROWS];
    }

    fn print_at(&mut self, col: u8, row: u8, text: &str) {
        let Some(line) = self.rows.get_mut(usize::from(row)) else {
            return;
        };
        for (cell, ch) in line.iter_mut().skip(usize::from(col)).zip(text.chars()) {
            *cell = if ch.is_ascii() && !ch.is_ascii_control() {
                ch as u8
            } else {
                UNKNOWN_GLYPH
            };
        }
        debug!("LCD | {} | {}", row, self.row(usize::from(row)));
    }

    fn request_redraw(&mut self) {
        self.redraws = self.redraws.saturating_add(1);
        info!("LCD | redraw requested");
    }
}
