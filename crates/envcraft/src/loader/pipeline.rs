//! The load pipeline.
//!
//! Responsibilities:
//! - Acquire the environment guard and the (optionally interpolated) env file.
//! - Resolve ephemeral fields, then stored fields, then derived values.
//! - Wrap coercion and derivation failures with the key they concern.
//!
//! Invariants:
//! - Missing values use the default first, then optionality, then skip-missing.
//! - Derived functions receive one frozen record holding stored and ephemeral values.
//! - Raw values are never logged; only keys and their source.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::options::LoadOptions;
use crate::env_file::{EnvFile, read_env_file};
use crate::environment::EnvironmentGuard;
use crate::error::ConfigError;
use crate::field::AnyField;
use crate::interpolate::interpolate;
use crate::naming::resolve_env_key;
use crate::record::{Record, Slot};
use crate::schema::{Entry, Schema};

/// Resolve `schema` into a record of stored and derived values.
///
/// # Errors
///
/// Returns the first error encountered:
/// - `ConfigError::EnvFileRead` / `EnvFileEncoding` if the env file exists but cannot be read.
/// - `ConfigError::CircularReference` / `UnresolvedReference` from interpolation.
/// - `ConfigError::Missing` for a required value found in no source.
/// - `ConfigError::Coercion` when a raw value is rejected by its field.
/// - `ConfigError::Derived` when a derived function fails.
pub fn load(schema: &Schema, options: LoadOptions<'_>) -> Result<Record, ConfigError> {
    let owned_guard;
    let env: &EnvironmentGuard = match (options.environment, options.env) {
        (Some(guard), _) => guard,
        (None, Some(vars)) => {
            owned_guard = EnvironmentGuard::from_map(vars);
            &owned_guard
        }
        (None, None) => EnvironmentGuard::process(),
    };

    let raw_file = match &options.env_file {
        Some(path) => read_env_file(path, options.encoding)?,
        None => EnvFile::new(),
    };

    let file = match &options.interpolation {
        Some(interpolation) => interpolate(&raw_file, env, interpolation)?,
        None => raw_file,
    };

    let sources = Sources {
        env,
        file: &file,
        prefix: &options.env_prefix,
        skip_missing: options.skip_missing,
    };

    let mut resolved = Record::new();
    for (key, entry) in schema.iter() {
        if let Entry::Ephemeral(field) = entry {
            resolved.insert(key, sources.resolve(key, field)?);
        }
    }
    for (key, entry) in schema.iter() {
        if let Entry::Stored(field) = entry {
            resolved.insert(key, sources.resolve(key, field)?);
        }
    }

    let snapshot = resolved;
    let mut output = Record::new();
    for (key, entry) in schema.iter() {
        match entry {
            Entry::Stored(_) => {
                if let Some(slot) = snapshot.slot(key) {
                    output.insert(key, slot.clone());
                }
            }
            Entry::Ephemeral(_) => {}
            Entry::Derived(derived) => {
                let value = derived
                    .compute(&snapshot)
                    .map_err(|e| ConfigError::Derived {
                        key: key.to_string(),
                        reason: format!("{:#}", e),
                    })?;
                debug!(key, "computed derived value");
                output.insert(key, Slot::Value(value));
            }
        }
    }

    info!(
        entries = output.len(),
        env_file = options.env_file.is_some(),
        "configuration loaded"
    );
    Ok(output)
}

/// Resolve `schema` and deserialize the result into `C`.
pub fn load_into<C: DeserializeOwned>(
    schema: &Schema,
    options: LoadOptions<'_>,
) -> Result<C, ConfigError> {
    load(schema, options)?.deserialize()
}

struct Sources<'a> {
    env: &'a EnvironmentGuard,
    file: &'a EnvFile,
    prefix: &'a str,
    skip_missing: bool,
}

impl Sources<'_> {
    fn resolve(&self, key: &str, field: &AnyField) -> Result<Slot, ConfigError> {
        let env_key = resolve_env_key(key, field.source_name(), self.prefix);

        let (raw, source) = match self.env.get(&env_key) {
            Some(raw) => (raw, "environment"),
            None => match self.file.get(&env_key) {
                Some(raw) => (raw.to_string(), "env file"),
                None => return self.missing(key, env_key, field),
            },
        };

        debug!(key, env_key = %env_key, source, "found raw value");
        match field.coerce_json(&raw) {
            Ok(value) => Ok(Slot::Value(value)),
            Err(e) => Err(ConfigError::Coercion {
                key: env_key,
                value: raw,
                reason: e.reason().to_string(),
            }),
        }
    }

    fn missing(&self, key: &str, env_key: String, field: &AnyField) -> Result<Slot, ConfigError> {
        if let Some(default) = field.default_json() {
            debug!(key, env_key = %env_key, "using default value");
            return match default {
                Ok(Value::Null) => Ok(Slot::Absent),
                Ok(value) => Ok(Slot::Value(value)),
                Err(e) => Err(ConfigError::ValueType {
                    key: env_key,
                    message: e.reason().to_string(),
                }),
            };
        }
        if field.is_optional() || self.skip_missing {
            debug!(key, env_key = %env_key, "value absent");
            return Ok(Slot::Absent);
        }
        Err(ConfigError::Missing { key: env_key })
    }
}
