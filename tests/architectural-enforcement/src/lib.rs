//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in engine or front-end code
//! - No blocking file I/O in the engine's async modules
//! - No unwrap()/expect() in engine production code
//!
//! The helpers here walk the workspace sources and hand the tests only the
//! production lines of each file: comments are stripped and scanning stops at
//! the first `#[cfg(test)]`, where every module keeps its tests.

use std::fs;
use std::path::{Path, PathBuf};

/// A source line that broke a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Workspace root, resolved from this crate's manifest
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Every `.rs` file under `dir`, relative to the workspace root
///
/// Panics if the directory is missing, so a moved crate cannot silently
/// pass every check.
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    assert!(root.is_dir(), "source directory {} not found", root.display());

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// Production lines of `content` as `(line_number, code)` pairs
///
/// Line comments and doc comments are removed; everything from the first
/// `#[cfg(test)]` onward is skipped.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .filter(|(_, code)| !code.trim().is_empty())
        .collect()
}

/// Scan every file under `dir` and report lines matching `is_violation`
pub fn scan(dir: &str, is_violation: impl Fn(&Path, &str) -> bool) -> Vec<Violation> {
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (line, code) in production_lines(&content) {
            if is_violation(&path, code) {
                violations.push(Violation {
                    path: path.clone(),
                    line,
                    text: code.trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Print violations and fail the test if there are any
pub fn report(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ CRITICAL: {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!(
        "\nFound {} violation(s) of: {rule}\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_skip_comments_and_tests() {
        let source = "\
//! Module docs mention std::thread::sleep
use std::sync::Arc; // trailing comment

fn work() {}

#[cfg(test)]
mod tests {
    fn helper() { std::thread::sleep(d); }
}
";
        let lines = production_lines(source);
        assert_eq!(lines, vec![(2, "use std::sync::Arc; "), (4, "fn work() {}")]);
    }

    #[test]
    fn test_workspace_root_contains_engine() {
        assert!(workspace_root().join("engine/core/src/lib.rs").is_file());
    }
}
