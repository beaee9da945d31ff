//! CLI command implementations.

pub mod expand;
pub mod key;
