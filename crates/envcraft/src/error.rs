//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define error variants for every failure a `load` call can surface.
//! - Define the guard misuse error raised by `EnvironmentGuard` writes.
//! - Define the leaf error returned by field coercers.
//!
//! Does NOT handle:
//! - Recovery or aggregation. Every error is terminal for the load that raised it.
//!
//! Invariants:
//! - Every variant names the external key, derived key, or reference it concerns.
//! - File read errors NEVER include raw `.env` contents, only the path and error kind.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving a configuration schema.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration value: {key}")]
    Missing { key: String },

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Coercion {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to compute derived value {key}: {reason}")]
    Derived { key: String, reason: String },

    /// A file value refers back to itself through a chain of references.
    ///
    /// `path` lists the keys in traversal order, e.g. `A -> B -> A`.
    #[error("Circular reference in interpolation: {path}")]
    CircularReference { path: String },

    #[error("Unresolved reference in interpolation: {name}")]
    UnresolvedReference { name: String },

    #[error("Failed to read env file at {path}: {kind}")]
    EnvFileRead { path: PathBuf, kind: ErrorKind },

    #[error("Env file at {path} is not valid {encoding}")]
    EnvFileEncoding { path: PathBuf, encoding: String },

    #[error("Value for {key} cannot be read as the requested type: {message}")]
    ValueType { key: String, message: String },

    #[error("Failed to deserialize configuration: {message}")]
    Deserialize { message: String },
}

/// Misuse of an [`EnvironmentGuard`](crate::EnvironmentGuard).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Cannot set {0}: the variable has already been read")]
    AlreadyRead(String),

    #[error("Cannot delete {0}: the variable has already been read")]
    DeleteAfterRead(String),

    /// The name is empty or contains `=` or a NUL byte.
    #[error("Invalid environment variable name: {0:?}")]
    InvalidKey(String),

    /// The value for the named variable contains a NUL byte.
    #[error("Invalid value for environment variable {0}: contains a NUL byte")]
    InvalidValue(String),
}

/// Failure of a field's parse function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct CoercionError {
    reason: String,
}

impl CoercionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Human-readable reason the raw value was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion_error_message_includes_key_value_and_reason() {
        let err = ConfigError::Coercion {
            key: "PORT".to_string(),
            value: "abc".to_string(),
            reason: "expected a number".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("PORT"));
        assert!(msg.contains("\"abc\""));
        assert!(msg.contains("expected a number"));
    }

    #[test]
    fn test_env_file_read_error_omits_contents() {
        let err = ConfigError::EnvFileRead {
            path: PathBuf::from("/tmp/.env"),
            kind: ErrorKind::PermissionDenied,
        };
        assert_eq!(
            err.to_string(),
            "Failed to read env file at /tmp/.env: permission denied"
        );
    }

    #[test]
    fn test_coercion_error_displays_reason() {
        let err = CoercionError::new("not a boolean");
        assert_eq!(err.to_string(), "not a boolean");
        assert_eq!(err.reason(), "not a boolean");
    }
}
