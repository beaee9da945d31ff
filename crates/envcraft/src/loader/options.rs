//! Options for a single `load` call.
//!
//! Responsibilities:
//! - Collect source selection (env file, explicit map, explicit guard) and policies.
//!
//! Invariants:
//! - An explicit guard overrides an explicit map; with neither, the process-wide
//!   guard is used.
//! - Interpolation is disabled unless requested.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::env_file::Encoding;
use crate::environment::EnvironmentGuard;
use crate::interpolate::InterpolationOptions;

/// Sources and policies for one `load` call.
#[derive(Default)]
pub struct LoadOptions<'a> {
    pub(super) env_file: Option<PathBuf>,
    pub(super) env_prefix: String,
    pub(super) encoding: Encoding,
    pub(super) env: Option<HashMap<String, String>>,
    pub(super) environment: Option<&'a EnvironmentGuard>,
    pub(super) interpolation: Option<InterpolationOptions>,
    pub(super) skip_missing: bool,
}

impl<'a> LoadOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read raw values from this env file. A missing file is treated as empty.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Prepend `prefix` to every external lookup key.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Resolve against this map instead of the process environment.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Resolve through this guard. Takes precedence over `with_env`.
    pub fn with_environment(mut self, guard: &'a EnvironmentGuard) -> Self {
        self.environment = Some(guard);
        self
    }

    /// Expand references in env file values before resolving fields.
    pub fn with_interpolation(mut self, options: InterpolationOptions) -> Self {
        self.interpolation = Some(options);
        self
    }

    /// Enable interpolation with default policies, or disable it.
    pub fn with_interpolate(mut self, enabled: bool) -> Self {
        self.interpolation = enabled.then(InterpolationOptions::default);
        self
    }

    /// Resolve missing required values to absent instead of failing.
    pub fn with_skip_missing(mut self, skip: bool) -> Self {
        self.skip_missing = skip;
        self
    }

    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    pub fn interpolation(&self) -> Option<&InterpolationOptions> {
        self.interpolation.as_ref()
    }
}
