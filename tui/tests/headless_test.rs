//! Headless surface end to end: engine events printed as log lines.

use tokio::sync::mpsc;

use gol_engine::{Board, Engine, EngineConfig, MemorySnapshotSink, RunOutcome};
use gol_tui::headless::print_events;

#[tokio::test]
async fn test_headless_log_for_short_run() {
    let config = EngineConfig::new(4, 32, 32, 10);
    let (events_tx, events_rx) = mpsc::channel(config.event_capacity);
    let (_keys_tx, keys_rx) = mpsc::channel(config.control_capacity);

    let engine = Engine::new(
        config,
        Board::random(32, 32, 5, 0.3),
        events_tx,
        keys_rx,
        MemorySnapshotSink::new(),
    )
    .unwrap();
    let handle = tokio::spawn(engine.run());

    let mut out = Vec::new();
    print_events(events_rx, &mut out).await.unwrap();
    let summary = handle.await.unwrap().unwrap();
    assert_eq!(summary.outcome, RunOutcome::Completed);

    let log = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3, "{log}");
    assert!(lines[0].starts_with("Completed Turns 10       Final Turn Complete"));
    assert_eq!(lines[1], "Completed Turns 10       File 32x32x10 Output Complete");
    assert_eq!(lines[2], "Completed Turns 10       Quitting");
}

#[tokio::test]
async fn test_headless_quit_key() {
    let config = EngineConfig::new(2, 16, 16, u64::MAX);
    let (events_tx, events_rx) = mpsc::channel(config.event_capacity);
    let (keys_tx, keys_rx) = mpsc::channel(config.control_capacity);
    keys_tx.send('q').await.unwrap();

    let engine = Engine::new(
        config,
        Board::new(16, 16),
        events_tx,
        keys_rx,
        MemorySnapshotSink::new(),
    )
    .unwrap();
    let handle = tokio::spawn(engine.run());

    let mut out = Vec::new();
    print_events(events_rx, &mut out).await.unwrap();

    assert_eq!(handle.await.unwrap().unwrap().outcome, RunOutcome::Quit);
    assert!(String::from_utf8(out).unwrap().ends_with("Quitting\n"));
}
