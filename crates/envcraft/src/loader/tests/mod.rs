//! Tests for the load pipeline.
//!
//! Responsibilities:
//! - Test source precedence, prefixes and name overrides.
//! - Test missing-value handling: defaults, optional fields, skip-missing.
//! - Test ephemeral and derived entries.
//! - Test interpolation as wired into `load`.
//!
//! Invariants:
//! - Tests inject their environment through `with_env` or a private guard,
//!   except `process_env_tests`, which use `serial_test` and `temp-env`.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;


/// Write `contents` to `.env` inside `dir` and return its path.
pub fn write_env_file(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join(".env");
    fs::write(&path, contents).expect("Failed to write .env file");
    path
}

/// An empty environment map for hermetic loads.
pub fn no_env() -> [(&'static str, &'static str); 0] {
    []
}
