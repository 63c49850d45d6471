//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Engine and front-end code MUST NOT call sleep methods. Turns
//! are paced by the barrier, the alive-count report by an interval, and the
//! terminal redraw by an interval.
//!
//! **Exceptions**: test code.

use architectural_enforcement::{report, scan};

const SOURCE_DIRS: &[&str] = &["engine/core/src", "tui/src"];

fn is_sleep(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(") || code.contains("sleep_until(")
}

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations: Vec<_> = SOURCE_DIRS
        .iter()
        .flat_map(|dir| scan(dir, |_, code| is_sleep(code)))
        .collect();

    report(
        "sleep calls in production code (use tokio::time::interval or wait on a channel)",
        &violations,
    );
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep("    tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_sleep("    std::thread::sleep(d);"));
    assert!(!is_sleep("    ticker.tick().await;"));
}
