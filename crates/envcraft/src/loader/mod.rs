//! Configuration loader for environment variables and env files.
//!
//! Responsibilities:
//! - Resolve a `Schema` against the environment and an optional env file.
//! - Provide a builder-pattern `LoadOptions` for source and policy selection.
//! - Run the four load phases: acquire sources, interpolate, resolve fields, derive.
//!
//! Does NOT handle:
//! - Parsing env file text (see `env_file`).
//! - Expanding references (see `interpolate`).
//! - Writing to the environment; the loader only reads through its guard.
//!
//! Invariants / Assumptions:
//! - Environment values take precedence over env file values for the same key.
//! - Ephemeral fields resolve before stored fields; derived values last.
//! - Ephemeral keys never appear in the output record.
//! - The first error in schema order aborts the load; there are no partial results.

mod options;
mod pipeline;

pub use options::LoadOptions;
pub use pipeline::{load, load_into};

#[cfg(test)]
mod tests;
