//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: The engine modules that run on the async runtime MUST NOT use
//! blocking file or network I/O.
//! **Required**: `tokio::fs` for snapshots and image loading.
//!
//! Configuration loading is synchronous by design and runs before the engine
//! starts, so `config.rs` is not checked.

use std::path::Path;

use architectural_enforcement::{report, scan};

/// Engine modules whose code runs inside the runtime
const ASYNC_MODULES: &[&str] = &[
    "broadcaster.rs",
    "control.rs",
    "coordinator.rs",
    "engine.rs",
    "pgm.rs",
    "snapshot.rs",
];

fn is_async_module(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| ASYNC_MODULES.contains(&name))
}

fn is_blocking_io(code: &str) -> bool {
    code.contains("std::fs")
        || code.contains("std::net")
        || code.contains("File::open(")
        || code.contains("File::create(")
        || code.contains("std::process::Command")
}

/// Test that async engine modules do not use blocking I/O
#[test]
fn test_no_blocking_io_in_async_engine_modules() {
    let violations = scan("engine/core/src", |path, code| {
        is_async_module(path) && is_blocking_io(code)
    });

    report(
        "blocking I/O in async engine modules (use tokio::fs)",
        &violations,
    );
}

/// Test that engine production code propagates errors instead of panicking
#[test]
fn test_no_unwrap_in_engine_production_code() {
    let violations = scan("engine/core/src", |_, code| {
        code.contains(".unwrap()") || code.contains(".expect(")
    });

    report("unwrap()/expect() in engine production code", &violations);
}

#[test]
fn test_blocking_io_detection() {
    assert!(is_blocking_io("use std::fs;"));
    assert!(is_blocking_io("    let bytes = std::fs::read(path)?;"));
    assert!(!is_blocking_io("    let bytes = tokio::fs::read(path).await?;"));
    assert!(is_async_module(Path::new("engine/core/src/snapshot.rs")));
    assert!(!is_async_module(Path::new("engine/core/src/config.rs")));
}
