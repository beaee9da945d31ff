//! Shared test utilities for envcraft-cli integration tests.
//!
//! Invariants:
//! - Policy variables from the host never leak into a test run.

use assert_cmd::Command;

/// Returns a hermetic `envcraft-cli` command.
pub fn envcraft_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("envcraft-cli");
    cmd.env_remove("ENVCRAFT_MISSING")
        .env_remove("ENVCRAFT_LOOKUP")
        .env_remove("RUST_LOG");
    cmd
}
