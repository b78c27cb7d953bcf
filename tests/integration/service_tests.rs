//! Integration tests for the FarmService: boot, mode switching, the
//! command intercept, the heartbeat cadence and liveness evaluation.

use crate::mock_hw::{MockPrinter, MockStore};

use farmwatch::app::commands::ModeCommand;
use farmwatch::app::events::FarmEvent;
use farmwatch::app::service::FarmService;
use farmwatch::config::{FarmConfig, storage_keys};
use farmwatch::liveness::Connectivity;

const STARTED: &str = "{[PRN:0][PFN:0]}";

fn service() -> FarmService {
    FarmService::new(FarmConfig::default())
}

/// Active service with the handshake already acknowledged.
fn confirmed() -> (FarmService, MockStore, MockPrinter) {
    let mut svc = service();
    let mut store = MockStore::new();
    let mut hw = MockPrinter::new();
    svc.activate(&mut store, &mut hw);
    assert!(svc.try_handle("PRUSA thx", &mut hw));
    hw.take_wire();
    (svc, store, hw)
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn erased_mode_byte_is_normalised_to_off() {
    let mut svc = service();
    let mut store = MockStore::with_byte(storage_keys::FARM_MODE, 0xFF);
    let mut hw = MockPrinter::new();

    svc.init(&mut store, &mut hw);

    assert!(!svc.is_active());
    assert_eq!(store.byte(storage_keys::FARM_MODE), Some(0));
    assert!(hw.wire.is_empty());
}

#[test]
fn missing_mode_byte_is_written_as_off() {
    let mut svc = service();
    let mut store = MockStore::new();
    let mut hw = MockPrinter::new();

    svc.init(&mut store, &mut hw);

    assert!(!svc.is_active());
    assert_eq!(store.byte(storage_keys::FARM_MODE), Some(0));
}

#[test]
fn stored_mode_resumes_with_handshake() {
    let mut svc = service();
    let mut store = MockStore::with_byte(storage_keys::FARM_MODE, 1);
    let mut hw = MockPrinter::new();

    svc.init(&mut store, &mut hw);

    assert!(svc.is_active());
    assert!(svc.state().is_awaiting_ack());
    assert_eq!(svc.state().pending_ack(), FarmEvent::PrinterStarted);
    assert_eq!(hw.wire, "{[PRN:0][PFN:0]}\n");
    assert!(hw.host_serial_opened);
    assert_eq!(hw.autoload, Some(false));
    assert_eq!(store.byte(storage_keys::FAN_CHECK), Some(1));
}

#[test]
fn stored_off_stays_quiet() {
    let mut svc = service();
    let mut store = MockStore::with_byte(storage_keys::FARM_MODE, 0);
    let mut hw = MockPrinter::new();

    svc.init(&mut store, &mut hw);

    assert!(!svc.is_active());
    assert_eq!(store.writes, 0);
    assert!(!hw.host_serial_opened);
}

// ── Mode switching ────────────────────────────────────────────

#[test]
fn g98_activates_and_announces_first() {
    let mut svc = service();
    let mut store = MockStore::new();
    let mut hw = MockPrinter::new();

    svc.handle_mode_command(ModeCommand::Activate, &mut store, &mut hw);

    assert!(svc.is_active());
    assert!(svc.state().is_awaiting_ack());
    assert_eq!(hw.frames().first().copied(), Some(STARTED));
    assert_eq!(svc.state().last_status(), 0);
    assert_eq!(store.byte(storage_keys::FARM_MODE), Some(1));
    assert_eq!(store.byte(storage_keys::SILENT_MODE), Some(0));
    assert_eq!(store.byte(storage_keys::FAN_CHECK), Some(1));
    assert_eq!(hw.silent_mode_resets, 1);
    assert_eq!(hw.fan_check_inits, 1);
    assert_eq!(hw.autoload, Some(false));
}

#[test]
fn repeated_g98_does_not_restart_handshake() {
    let (mut svc, mut store, mut hw) = confirmed();

    svc.handle_mode_command(ModeCommand::Activate, &mut store, &mut hw);

    assert!(hw.wire.is_empty());
    assert!(!svc.state().is_awaiting_ack());
    assert_eq!(hw.fan_check_inits, 2);
    assert_eq!(hw.silent_mode_resets, 2);
}

#[test]
fn g99_twice_is_safe() {
    let mut svc = service();
    let mut store = MockStore::new();
    let mut hw = MockPrinter::new();
    svc.activate(&mut store, &mut hw);

    svc.handle_mode_command(ModeCommand::Deactivate, &mut store, &mut hw);
    svc.handle_mode_command(ModeCommand::Deactivate, &mut store, &mut hw);

    assert!(!svc.is_active());
    assert!(!svc.state().is_awaiting_ack());
    assert!(svc.liveness().is_connected());
    assert_eq!(store.byte(storage_keys::FARM_MODE), Some(0));
    assert_eq!(hw.redraws(), 2);
    assert_eq!(hw.fan_check_inits, 3);
}

#[test]
fn disable_skips_machine_side_effects() {
    let (mut svc, mut store, hw) = confirmed();
    let inits = hw.fan_check_inits;

    svc.disable(&mut store);

    assert!(!svc.is_active());
    assert_eq!(store.byte(storage_keys::FARM_MODE), Some(0));
    assert_eq!(hw.fan_check_inits, inits);
    assert_eq!(hw.redraws(), 0);
}

#[test]
fn storage_failure_keeps_session_state() {
    let mut svc = service();
    let mut store = MockStore::new();
    store.fail_writes = true;
    let mut hw = MockPrinter::new();

    svc.activate(&mut store, &mut hw);

    assert!(svc.is_active());
    assert_eq!(hw.frames(), vec![STARTED]);
    assert!(store.data.is_empty());
}

// ── Command intercept ─────────────────────────────────────────

#[test]
fn intercept_inactive_claims_nothing() {
    let mut svc = service();
    let mut hw = MockPrinter::new();

    for line in ["PRUSA Ping", "PRUSA PRN", "PRUSA thx"] {
        assert!(!svc.try_handle(line, &mut hw));
    }
    assert!(hw.wire.is_empty());
}

#[test]
fn ping_refreshes_liveness() {
    let (mut svc, _store, mut hw) = confirmed();
    hw.now = 50_000;

    assert!(svc.try_handle("PRUSA Ping", &mut hw));
    assert_eq!(svc.liveness().last_ping_ms(), 50_000);
    assert!(hw.wire.is_empty());
}

#[test]
fn prn_reports_last_status_without_newline() {
    let (mut svc, _store, mut hw) = confirmed();
    svc.emit(FarmEvent::Heating, &mut hw);
    hw.take_wire();

    assert!(svc.try_handle("PRUSA PRN", &mut hw));
    assert_eq!(hw.wire, "2");
}

#[test]
fn ack_clears_once() {
    let mut svc = service();
    let mut store = MockStore::new();
    let mut hw = MockPrinter::new();
    svc.activate(&mut store, &mut hw);
    assert!(svc.state().is_awaiting_ack());

    assert!(svc.try_handle("PRUSA thx", &mut hw));
    assert!(!svc.state().is_awaiting_ack());
    assert!(svc.try_handle("PRUSA thx", &mut hw));
    assert!(!svc.state().is_awaiting_ack());
}

#[test]
fn unknown_lines_reach_dispatcher() {
    let (mut svc, mut store, mut hw) = confirmed();
    hw.enqueue("G28");
    hw.enqueue("PRUSA Ping");
    hw.enqueue("PRUSA fw");

    while svc.drain_one(&mut store, &mut hw) {}

    assert_eq!(hw.dispatched, vec!["G28", "PRUSA fw"]);
    assert!(!svc.drain_one(&mut store, &mut hw));
}

#[test]
fn queued_g99_switches_mode_off() {
    let (mut svc, mut store, mut hw) = confirmed();
    hw.enqueue("G99");

    assert!(svc.drain_one(&mut store, &mut hw));

    assert!(!svc.is_active());
    assert!(hw.dispatched.is_empty());
}

// ── Emission ──────────────────────────────────────────────────

#[test]
fn emit_is_silent_while_inactive() {
    let mut svc = service();
    let mut hw = MockPrinter::new();
    svc.emit(FarmEvent::Heartbeat, &mut hw);
    assert!(hw.wire.is_empty());
}

#[test]
fn filament_change_leaves_frame_open() {
    let (mut svc, _store, mut hw) = confirmed();

    svc.emit(FarmEvent::FilamentChange, &mut hw);

    assert_eq!(hw.wire, "{[PRN:5][PFN:0]");
    assert_eq!(svc.state().last_status(), 5);
}

#[test]
fn print_result_echoes_last_status() {
    let (mut svc, _store, mut hw) = confirmed();
    hw.snapshot.job.sd_printing = true;
    svc.emit(FarmEvent::HeatingDone, &mut hw);
    hw.take_wire();

    svc.emit(FarmEvent::PrintSucceeded, &mut hw);

    assert_eq!(hw.wire, "{[RES:1][FIL:0][PRN:4][PFN:0]}\n");
    assert_eq!(svc.heartbeat().remaining(), 2);
}

// ── Heartbeat ─────────────────────────────────────────────────

#[test]
fn heartbeat_cadence_while_idle() {
    let (mut svc, _store, mut hw) = confirmed();
    // The activation announcement pulled the countdown to 2.
    assert_eq!(svc.heartbeat().remaining(), 2);

    svc.on_status_screen_tick(&mut hw);
    assert!(hw.wire.is_empty());

    svc.on_status_screen_tick(&mut hw);
    assert_eq!(hw.take_wire(), "{[PRN:1][PFN:0][DIA:400]}\n");

    svc.on_status_screen_tick(&mut hw); // 9
    svc.on_status_screen_tick(&mut hw); // 8
    assert_eq!(
        hw.take_wire(),
        "{[ST0:215][STB:60][AT0:214.50][ATB:60.00][PFN:0][PRN:1]}\n"
    );

    // Idle: no progress echo at the progress slot.
    for _ in 0..3 {
        svc.on_status_screen_tick(&mut hw);
    }
    assert!(hw.wire.is_empty());
}

#[test]
fn heartbeat_echoes_progress_while_printing() {
    let (mut svc, _store, mut hw) = confirmed();
    hw.snapshot.job.sd_printing = true;

    // 2 → 1 → 0 (status), 9, 8, 7, 6, 5 (echo).
    for _ in 0..7 {
        svc.on_status_screen_tick(&mut hw);
    }

    let frames = hw.frames();
    assert!(frames[0].starts_with("{[PRN:4][PFN:0][TFU:"));
    assert!(frames[1].starts_with("{[ST0:"));
    // Busy default status does not overwrite the last status (0).
    assert_eq!(frames.last().copied(), Some(STARTED));
    // The echo reloads the countdown.
    assert_eq!(svc.heartbeat().remaining(), 4);
}

#[test]
fn heartbeat_reports_filament_wait_while_loading() {
    let (mut svc, _store, mut hw) = confirmed();
    hw.snapshot.job.loading_filament = true;

    for _ in 0..4 {
        svc.on_status_screen_tick(&mut hw);
    }

    let frames = hw.frames();
    assert_eq!(frames.len(), 3);
    assert!(frames[1].starts_with("{[ST0:"));
    assert_eq!(frames[2], "{[PRN:5][PFN:0]}");
    assert_eq!(svc.state().last_status(), 5);
}

#[test]
fn heartbeat_stops_when_inactive() {
    let (mut svc, mut store, mut hw) = confirmed();
    svc.deactivate(&mut store, &mut hw);

    for _ in 0..20 {
        svc.on_status_screen_tick(&mut hw);
    }
    assert!(hw.wire.is_empty());
}

// ── Liveness ──────────────────────────────────────────────────

#[test]
fn silence_flags_disconnect_with_empty_queue() {
    let (mut svc, mut store, mut hw) = confirmed();

    hw.now = 59_000;
    assert_eq!(svc.on_ui_tick(&mut store, &mut hw), None);
    assert!(svc.liveness().is_connected());

    hw.now = 61_000;
    assert_eq!(svc.on_ui_tick(&mut store, &mut hw), None);
    assert_eq!(svc.liveness().state(), Connectivity::SuspectedDisconnected);
}

#[test]
fn queued_work_extends_silence_threshold() {
    let (mut svc, mut store, mut hw) = confirmed();
    hw.enqueue("G1 X10");

    hw.now = 599_000;
    svc.on_ui_tick(&mut store, &mut hw);
    assert!(svc.liveness().is_connected());

    hw.now = 601_000;
    svc.on_ui_tick(&mut store, &mut hw);
    assert!(!svc.liveness().is_connected());
}

#[test]
fn ping_after_silence_reconnects() {
    let (mut svc, mut store, mut hw) = confirmed();
    hw.now = 70_000;
    svc.on_ui_tick(&mut store, &mut hw);
    assert!(!svc.liveness().is_connected());

    hw.enqueue("PRUSA Ping");
    svc.drain_one(&mut store, &mut hw);
    svc.on_ui_tick(&mut store, &mut hw);
    assert!(svc.liveness().is_connected());
}
