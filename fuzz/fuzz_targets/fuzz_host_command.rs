//! Fuzz target: host lines through `FarmService::drain_one`
//!
//! Splits arbitrary bytes into host lines and feeds them through an active
//! farm service.  Each line is also checked against both parsers: a
//! recognised host token must lead the line once the optional `PRUSA`
//! verb is removed.  The service must never panic, every queued line must
//! be consumed exactly once, and unclaimed lines must reach the
//! dispatcher untouched.
//!
//! cargo fuzz run fuzz_host_command

#![no_main]

use farmwatch::adapters::nvs::NvsStore;
use farmwatch::app::commands::{HostCommand, ModeCommand};
use farmwatch::app::ports::{
    ButtonPort, ClockPort, CommandQueuePort, DisplayPort, MachinePort, StoragePort, WirePort,
};
use farmwatch::app::service::FarmService;
use farmwatch::config::{FarmConfig, storage_keys};
use farmwatch::protocol::line::{HostLine, LineDecoder};
use farmwatch::protocol::snapshot::MachineSnapshot;
use libfuzzer_sys::fuzz_target;
use std::collections::VecDeque;

#[derive(Default)]
struct FuzzPrinter {
    wire: String,
    queue: VecDeque<HostLine>,
    dispatched: Vec<String>,
    now: u64,
}

impl WirePort for FuzzPrinter {
    fn write_str(&mut self, text: &str) {
        self.wire.push_str(text);
    }
}

impl MachinePort for FuzzPrinter {
    fn snapshot(&mut self) -> MachineSnapshot {
        MachineSnapshot::default()
    }
    fn init_fan_check(&mut self) {}
    fn set_filament_autoload(&mut self, _enabled: bool) {}
    fn reset_silent_mode(&mut self) {}
    fn open_host_serial(&mut self) {}
}

impl CommandQueuePort for FuzzPrinter {
    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
    fn pop_front(&mut self) -> Option<HostLine> {
        self.queue.pop_front()
    }
    fn dispatch(&mut self, line: &str) {
        self.dispatched.push(line.to_owned());
    }
}

impl ClockPort for FuzzPrinter {
    fn now_ms(&self) -> u64 {
        self.now
    }
    fn delay_keep_alive(&mut self, ms: u32) {
        self.now += u64::from(ms);
    }
}

impl ButtonPort for FuzzPrinter {
    fn is_pressed(&mut self) -> bool {
        false
    }
}

impl DisplayPort for FuzzPrinter {
    fn set_update_enabled(&mut self, _enabled: bool) {}
    fn clear(&mut self) {}
    fn print_at(&mut self, _col: u8, _row: u8, _text: &str) {}
    fn request_redraw(&mut self) {}
}

fn check_parsers(line: &str) {
    let body = line.trim();
    let body = body.strip_prefix("PRUSA").map_or(body, str::trim_start);
    match HostCommand::parse(line) {
        Some(HostCommand::Ping) => assert!(body.starts_with("Ping")),
        Some(HostCommand::StatusQuery) => assert!(body.starts_with("PRN")),
        Some(HostCommand::Ack) => assert!(body.starts_with("thx")),
        None => {}
    }

    if ModeCommand::parse(line).is_some() {
        assert!(line.trim_start().starts_with("G9"));
    }
}

fuzz_target!(|data: &[u8]| {
    let mut lines = Vec::new();
    LineDecoder::new().feed(data, |line| lines.push(line));

    let Ok(mut store) = NvsStore::new() else {
        return;
    };
    let _ = store.update_byte(storage_keys::FARM_MODE, 1);

    let mut hw = FuzzPrinter::default();
    let mut farm = FarmService::new(FarmConfig::default());
    farm.init(&mut store, &mut hw);

    let mut expected_dispatch = Vec::new();
    for line in &lines {
        check_parsers(line);
        let claimed = ModeCommand::parse(line).is_some()
            || (farm.is_active() && HostCommand::parse(line).is_some());

        hw.queue.push_back(line.clone());
        assert!(farm.drain_one(&mut store, &mut hw));
        assert!(hw.queue.is_empty());

        if !claimed {
            expected_dispatch.push(line.as_str().to_owned());
        }
        hw.now += 100;
        farm.on_status_screen_tick(&mut hw);
    }

    assert!(!farm.drain_one(&mut store, &mut hw));
    assert_eq!(hw.dispatched, expected_dispatch);
});
