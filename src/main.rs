//! Farmwatch bench firmware: ESP-IDF entry point.
//!
//! Runs the farm layer on a bare ESP32 board so a monitoring host can be
//! exercised without a printer: the machine state is a fixed bench
//! snapshot, the LCD is the log, and the BOOT button is the knob.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  IoWire<Stdout>   LineQueue   SystemClock   ConfirmButton      │
//! │  (WirePort)       (Queue)     (ClockPort)   (ButtonPort)       │
//! │  LogDisplay       NvsStore    BenchPrinter                     │
//! │  (DisplayPort)    (Storage)   (MachinePort)                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              FarmService (pure logic)                  │    │
//! │  │  State · Heartbeat · Liveness · Handshake              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  stdin reader thread ──▶ LineDecoder ──▶ mpsc ──▶ LineQueue    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::Read;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::gpio::{Input, InputPin as EspInputPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use log::{info, warn};

use farmwatch::adapters::display::LogDisplay;
use farmwatch::adapters::line_queue::LineQueue;
use farmwatch::adapters::nvs::NvsStore;
use farmwatch::adapters::serial::IoWire;
use farmwatch::adapters::time::SystemClock;
use farmwatch::app::ports::{
    ButtonPort, ClockPort, CommandQueuePort, DisplayPort, MachinePort, WirePort,
};
use farmwatch::app::service::FarmService;
use farmwatch::config::FarmConfig;
use farmwatch::drivers::button::ConfirmButton;
use farmwatch::error;
use farmwatch::protocol::line::{HostLine, LineDecoder};
use farmwatch::protocol::snapshot::{JobState, MachineSnapshot, bounded};

/// UI refresh period.
const UI_TICK_MS: u32 = 100;

/// UI ticks per status-screen refresh.
const STATUS_TICK_DIVIDER: u32 = 10;

const READER_STACK_SIZE: usize = 4096;

// ── Bench printer ─────────────────────────────────────────────
//
// Bundles every port the service needs.  Serial RX is pumped from the
// reader thread into the command queue on each keep-alive delay, so the
// blocking connection prompt still sees host lines.

struct BenchPrinter<'d, P: EspInputPin> {
    wire: IoWire<std::io::Stdout>,
    queue: LineQueue<fn(&str)>,
    rx: Receiver<HostLine>,
    clock: SystemClock,
    button: ConfirmButton<PinDriver<'d, P, Input>>,
    display: LogDisplay,
    snapshot: MachineSnapshot,
}

impl<P: EspInputPin> BenchPrinter<'_, P> {
    fn pump_rx(&mut self) {
        while let Ok(line) = self.rx.try_recv() {
            self.queue.push(line);
        }
    }
}

impl<P: EspInputPin> WirePort for BenchPrinter<'_, P> {
    fn write_str(&mut self, text: &str) {
        self.wire.write_str(text);
    }
}

impl<P: EspInputPin> MachinePort for BenchPrinter<'_, P> {
    fn snapshot(&mut self) -> MachineSnapshot {
        self.snapshot.clone()
    }

    fn init_fan_check(&mut self) {
        info!("Bench: fan check re-initialised");
    }

    fn set_filament_autoload(&mut self, enabled: bool) {
        info!("Bench: filament autoload {}", if enabled { "on" } else { "off" });
    }

    fn reset_silent_mode(&mut self) {
        info!("Bench: silent mode off");
    }

    fn open_host_serial(&mut self) {
        // Stdout is already routed to the host UART.
        info!("Bench: host serial on console UART");
    }
}

impl<P: EspInputPin> CommandQueuePort for BenchPrinter<'_, P> {
    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn pop_front(&mut self) -> Option<HostLine> {
        self.queue.pop_front()
    }

    fn dispatch(&mut self, line: &str) {
        self.queue.dispatch(line);
    }
}

impl<P: EspInputPin> ClockPort for BenchPrinter<'_, P> {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn delay_keep_alive(&mut self, ms: u32) {
        self.clock.delay_keep_alive(ms);
        self.pump_rx();
    }
}

impl<P: EspInputPin> ButtonPort for BenchPrinter<'_, P> {
    fn is_pressed(&mut self) -> bool {
        self.button.is_pressed()
    }
}

impl<P: EspInputPin> DisplayPort for BenchPrinter<'_, P> {
    fn set_update_enabled(&mut self, enabled: bool) {
        self.display.set_update_enabled(enabled);
    }

    fn clear(&mut self) {
        self.display.clear();
    }

    fn print_at(&mut self, col: u8, row: u8, text: &str) {
        self.display.print_at(col, row, text);
    }

    fn request_redraw(&mut self) {
        self.display.request_redraw();
    }
}

fn bench_dispatch(line: &str) {
    info!("G-code | {}", line);
}

fn bench_snapshot() -> MachineSnapshot {
    MachineSnapshot {
        job: JobState::default(),
        hotend_target_c: 0,
        bed_target_c: 0,
        hotend_c: 23.5,
        bed_c: 23.0,
        firmware_version: bounded(env!("CARGO_PKG_VERSION")),
        nozzle_diameter_um: 400,
        feed_multiplier: 100,
        ..MachineSnapshot::default()
    }
}

/// Bring up NVS and read the stored farm config.
fn open_storage() -> error::Result<(NvsStore, FarmConfig)> {
    let nvs = NvsStore::new()?;
    let config = FarmConfig::load_or_default(&nvs);
    Ok((nvs, config))
}

/// Read the console UART, split it into lines and hand them to the main
/// loop.
fn spawn_reader(tx: Sender<HostLine>) -> Result<()> {
    std::thread::Builder::new()
        .name("host-rx".into())
        .stack_size(READER_STACK_SIZE)
        .spawn(move || {
            let mut decoder = LineDecoder::new();
            let mut buf = [0u8; 64];
            let stdin = std::io::stdin();
            loop {
                match stdin.lock().read(&mut buf) {
                    Ok(n) if n > 0 => decoder.feed(&buf[..n], |line| {
                        let _ = tx.send(line);
                    }),
                    _ => std::thread::sleep(Duration::from_millis(10)),
                }
            }
        })?;
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Farmwatch bench v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Storage and config ─────────────────────────────────
    let (mut nvs, config) = open_storage()?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let mut knob = PinDriver::input(peripherals.pins.gpio0)?;
    knob.set_pull(Pull::Up)?;

    let (tx, rx) = mpsc::channel();
    spawn_reader(tx)?;

    let mut bench = BenchPrinter {
        wire: IoWire::new(std::io::stdout()),
        queue: LineQueue::new(bench_dispatch as fn(&str)),
        rx,
        clock: SystemClock::new(),
        button: ConfirmButton::new(knob),
        display: LogDisplay::new(),
        snapshot: bench_snapshot(),
    };

    // ── 4. Farm service ───────────────────────────────────────
    let mut farm = FarmService::new(config);
    farm.init(&mut nvs, &mut bench);
    info!(
        "System ready (farm mode {}). Entering main loop.",
        if farm.is_active() { "on" } else { "off" }
    );

    // ── 5. Main loop ──────────────────────────────────────────
    let mut ui_ticks: u32 = 0;
    loop {
        bench.delay_keep_alive(UI_TICK_MS);

        if let Some(by) = farm.on_ui_tick(&mut nvs, &mut bench) {
            info!("Handshake resolved by {:?}", by);
        }

        ui_ticks = ui_ticks.wrapping_add(1);
        if ui_ticks % STATUS_TICK_DIVIDER == 0 {
            farm.on_status_screen_tick(&mut bench);
        }

        while farm.drain_one(&mut nvs, &mut bench) {}

        if bench.queue.overflows() > 0 && ui_ticks % 600 == 0 {
            warn!("{} host lines dropped on full queue", bench.queue.overflows());
        }
    }
}
