//! Integration tests for the connection-confirmation handshake and the
//! blocking prompt that runs while the host is silent.

use crate::mock_hw::{DisplayCall, MockPrinter, MockStore};

use farmwatch::app::service::FarmService;
use farmwatch::config::{FarmConfig, storage_keys};
use farmwatch::handshake::{ConfirmedBy, PROGRESS_ROW, PROMPT_LINES};

const STARTED: &str = "{[PRN:0][PFN:0]}";

/// Host went silent right after activation at t = 0.
const SILENT_AT: u64 = 61_000;

fn pending() -> (FarmService, MockStore, MockPrinter) {
    let mut svc = FarmService::new(FarmConfig::default());
    let mut store = MockStore::new();
    let mut hw = MockPrinter::new();
    svc.activate(&mut store, &mut hw);
    assert!(svc.state().is_awaiting_ack());
    (svc, store, hw)
}

#[test]
fn pending_status_reannounced_every_ten_seconds() {
    let (mut svc, mut store, mut hw) = pending();

    hw.now = 9_999;
    svc.on_ui_tick(&mut store, &mut hw);
    assert_eq!(hw.count_frames(STARTED), 1);

    hw.now = 10_000;
    svc.on_ui_tick(&mut store, &mut hw);
    assert_eq!(hw.count_frames(STARTED), 2);

    hw.now = 15_000;
    svc.on_ui_tick(&mut store, &mut hw);
    assert_eq!(hw.count_frames(STARTED), 2);

    hw.now = 20_000;
    svc.on_ui_tick(&mut store, &mut hw);
    assert_eq!(hw.count_frames(STARTED), 3);
    assert!(hw.display.is_empty(), "no prompt while the host pings");
}

#[test]
fn acknowledged_handshake_stops_reannouncing() {
    let (mut svc, mut store, mut hw) = pending();
    assert!(svc.try_handle("PRUSA thx", &mut hw));

    for now in [10_000, 20_000, 30_000] {
        hw.now = now;
        svc.on_ui_tick(&mut store, &mut hw);
    }
    assert_eq!(hw.count_frames(STARTED), 1);
}

#[test]
fn prompt_resolved_by_host_ack() {
    let (mut svc, mut store, mut hw) = pending();
    hw.now = SILENT_AT;
    hw.schedule(SILENT_AT + 500, "PRUSA thx");

    let outcome = svc.on_ui_tick(&mut store, &mut hw);

    assert_eq!(outcome, Some(ConfirmedBy::HostAck));
    assert!(!svc.state().is_awaiting_ack());
    assert_eq!(hw.delays, 5);
    assert!(hw.printed(PROGRESS_ROW).is_empty());

    // Prompt drawn, then the display handed back.
    assert_eq!(hw.display[0], DisplayCall::UpdateEnabled(false));
    assert_eq!(hw.display[1], DisplayCall::Clear);
    for (row, text) in PROMPT_LINES.iter().enumerate() {
        assert_eq!(hw.printed(row as u8), vec![*text]);
    }
    let n = hw.display.len();
    assert_eq!(hw.display[n - 2], DisplayCall::UpdateEnabled(true));
    assert_eq!(hw.display[n - 1], DisplayCall::Redraw);
}

#[test]
fn long_press_confirms_after_exactly_fifteen_seconds() {
    let (mut svc, mut store, mut hw) = pending();
    hw.now = SILENT_AT;
    hw.button_default = true;

    let outcome = svc.on_ui_tick(&mut store, &mut hw);

    assert_eq!(outcome, Some(ConfirmedBy::LongPress));
    assert_eq!(hw.delays, 150);
    assert_eq!(hw.now, SILENT_AT + 15_000);
    assert!(!svc.state().is_awaiting_ack());
    assert!(svc.is_active());

    // Activation, the overdue re-announce, then one per second of prompt.
    assert_eq!(hw.count_frames(STARTED), 1 + 1 + 15);
}

#[test]
fn release_at_fourteen_seconds_resets_progress() {
    let (mut svc, mut store, mut hw) = pending();
    hw.now = SILENT_AT;
    hw.button_script.extend(std::iter::repeat_n(true, 140));
    hw.button_script.push_back(false);
    hw.button_default = true;

    let outcome = svc.on_ui_tick(&mut store, &mut hw);

    assert_eq!(outcome, Some(ConfirmedBy::LongPress));
    assert_eq!(hw.delays, 140 + 1 + 150);

    let blanks = hw
        .printed(PROGRESS_ROW)
        .iter()
        .filter(|t| t.trim().is_empty())
        .count();
    assert_eq!(blanks, 1);
}

#[test]
fn g99_during_prompt_abandons_it() {
    let (mut svc, mut store, mut hw) = pending();
    hw.now = SILENT_AT;
    hw.schedule(SILENT_AT + 300, "G99");

    let outcome = svc.on_ui_tick(&mut store, &mut hw);

    assert_eq!(outcome, None);
    assert!(!svc.is_active());
    assert_eq!(store.byte(storage_keys::FARM_MODE), Some(0));
    assert_eq!(hw.delays, 3);
    assert_eq!(hw.display.last(), Some(&DisplayCall::Redraw));
}

#[test]
fn other_commands_keep_flowing_during_prompt() {
    let (mut svc, mut store, mut hw) = pending();
    hw.now = SILENT_AT;
    hw.schedule(SILENT_AT + 100, "M105");
    hw.schedule(SILENT_AT + 200, "PRUSA PRN");
    hw.schedule(SILENT_AT + 300, "PRUSA thx");

    assert_eq!(
        svc.on_ui_tick(&mut store, &mut hw),
        Some(ConfirmedBy::HostAck)
    );
    assert_eq!(hw.dispatched, vec!["M105"]);
    // The status query reply is a bare number.
    assert!(hw.wire.ends_with("}\n0"));
}
