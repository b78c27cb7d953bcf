//! Mock printer for integration tests.
//!
//! Implements every port the farm service touches and records each call,
//! so tests can assert on the exact wire output and display history
//! without a controller.  Time only moves when a test sets it or the
//! service sleeps through `delay_keep_alive`.

use std::collections::{HashMap, VecDeque};

use farmwatch::app::ports::{
    ButtonPort, ClockPort, CommandQueuePort, DisplayPort, MachinePort, StoragePort, WirePort,
};
use farmwatch::error::StorageError;
use farmwatch::protocol::line::HostLine;
use farmwatch::protocol::snapshot::{MachineSnapshot, bounded};

// ── Display call record ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    UpdateEnabled(bool),
    Clear,
    Print { col: u8, row: u8, text: String },
    Redraw,
}

// ── MockPrinter ───────────────────────────────────────────────

pub struct MockPrinter {
    /// Everything written to the host, concatenated.
    pub wire: String,
    pub snapshot: MachineSnapshot,

    pub queue: VecDeque<HostLine>,
    pub dispatched: Vec<String>,
    /// Host lines delivered into the queue once the clock reaches them.
    pub inbound: VecDeque<(u64, String)>,

    pub now: u64,
    pub delays: u32,

    /// Scripted button samples, consumed one per read.
    pub button_script: VecDeque<bool>,
    /// Level reported once the script is exhausted.
    pub button_default: bool,

    pub display: Vec<DisplayCall>,

    pub fan_check_inits: u32,
    pub autoload: Option<bool>,
    pub silent_mode_resets: u32,
    pub host_serial_opened: bool,
}

#[allow(dead_code)]
impl MockPrinter {
    pub fn new() -> Self {
        Self {
            wire: String::new(),
            snapshot: MachineSnapshot {
                hotend_target_c: 215,
                bed_target_c: 60,
                hotend_c: 214.5,
                bed_c: 60.0,
                feed_multiplier: 100,
                firmware_version: bounded("3.14.1"),
                nozzle_diameter_um: 400,
                ..MachineSnapshot::default()
            },
            queue: VecDeque::new(),
            dispatched: Vec::new(),
            inbound: VecDeque::new(),
            now: 0,
            delays: 0,
            button_script: VecDeque::new(),
            button_default: false,
            display: Vec::new(),
            fan_check_inits: 0,
            autoload: None,
            silent_mode_resets: 0,
            host_serial_opened: false,
        }
    }

    /// Queue a host line immediately.
    pub fn enqueue(&mut self, line: &str) {
        self.queue.push_back(bounded(line));
    }

    /// Deliver `line` into the queue once the clock reaches `at_ms`.
    pub fn schedule(&mut self, at_ms: u64, line: &str) {
        self.inbound.push_back((at_ms, line.to_string()));
    }

    /// Closed frames written so far, without their newline.
    pub fn frames(&self) -> Vec<&str> {
        self.wire.split_terminator('\n').collect()
    }

    pub fn count_frames(&self, frame: &str) -> usize {
        self.frames().iter().filter(|f| **f == frame).count()
    }

    pub fn take_wire(&mut self) -> String {
        std::mem::take(&mut self.wire)
    }

    pub fn printed(&self, row: u8) -> Vec<&str> {
        self.display
            .iter()
            .filter_map(|c| match c {
                DisplayCall::Print { row: r, text, .. } if *r == row => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn redraws(&self) -> usize {
        self.display
            .iter()
            .filter(|c| **c == DisplayCall::Redraw)
            .count()
    }

    fn deliver_due(&mut self) {
        while let Some((at, _)) = self.inbound.front() {
            if *at > self.now {
                break;
            }
            if let Some((_, line)) = self.inbound.pop_front() {
                self.queue.push_back(bounded(&line));
            }
        }
    }
}

impl Default for MockPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl WirePort for MockPrinter {
    fn write_str(&mut self, text: &str) {
        self.wire.push_str(text);
    }
}

impl MachinePort for MockPrinter {
    fn snapshot(&mut self) -> MachineSnapshot {
        self.snapshot.clone()
    }

    fn init_fan_check(&mut self) {
        self.fan_check_inits += 1;
    }

    fn set_filament_autoload(&mut self, enabled: bool) {
        self.autoload = Some(enabled);
    }

    fn reset_silent_mode(&mut self) {
        self.silent_mode_resets += 1;
    }

    fn open_host_serial(&mut self) {
        self.host_serial_opened = true;
    }
}

impl CommandQueuePort for MockPrinter {
    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn pop_front(&mut self) -> Option<HostLine> {
        self.queue.pop_front()
    }

    fn dispatch(&mut self, line: &str) {
        self.dispatched.push(line.to_string());
    }
}

impl ClockPort for MockPrinter {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_keep_alive(&mut self, ms: u32) {
        self.now += u64::from(ms);
        self.delays += 1;
        self.deliver_due();
    }
}

impl ButtonPort for MockPrinter {
    fn is_pressed(&mut self) -> bool {
        self.button_script
            .pop_front()
            .unwrap_or(self.button_default)
    }
}

impl DisplayPort for MockPrinter {
    fn set_update_enabled(&mut self, enabled: bool) {
        self.display.push(DisplayCall::UpdateEnabled(enabled));
    }

    fn clear(&mut self) {
        self.display.push(DisplayCall::Clear);
    }

    fn print_at(&mut self, col: u8, row: u8, text: &str) {
        self.display.push(DisplayCall::Print {
            col,
            row,
            text: text.to_string(),
        });
    }

    fn request_redraw(&mut self) {
        self.display.push(DisplayCall::Redraw);
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    pub data: HashMap<String, Vec<u8>>,
    pub writes: u32,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_byte(key: &str, value: u8) -> Self {
        let mut store = Self::new();
        store.data.insert(key.to_string(), vec![value]);
        store
    }

    pub fn byte(&self, key: &str) -> Option<u8> {
        self.data.get(key).and_then(|v| v.first().copied())
    }
}

impl StoragePort for MockStore {
    fn read(&self, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.data.get(key).ok_or(StorageError::NotFound)?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.writes += 1;
        self.data.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.data.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}
