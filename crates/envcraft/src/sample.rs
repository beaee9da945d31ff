//! Sample env file generation.
//!
//! Emits one commented `KEY=` line per stored field so a schema can be turned
//! into a template for operators. Ephemeral and derived entries are skipped.

use serde_json::Value;

use crate::constants::{SAMPLE_DEFAULT_PREFIX, SAMPLE_OPTIONAL, SAMPLE_REQUIRED};
use crate::naming::resolve_env_key;
use crate::schema::{Entry, Schema};

/// Render a commented `KEY=` template for every stored field in `schema`.
pub fn generate_sample(schema: &Schema, prefix: &str) -> String {
    let blocks: Vec<String> = schema
        .iter()
        .filter_map(|(key, entry)| match entry {
            Entry::Stored(field) => {
                let comment = match field.default_json() {
                    Some(Ok(Value::Null)) => SAMPLE_OPTIONAL.to_string(),
                    Some(Ok(Value::String(default))) => {
                        format!("{}{}", SAMPLE_DEFAULT_PREFIX, default)
                    }
                    Some(Ok(default)) => format!("{}{}", SAMPLE_DEFAULT_PREFIX, default),
                    Some(Err(_)) | None if field.is_optional() => SAMPLE_OPTIONAL.to_string(),
                    Some(Err(_)) | None => SAMPLE_REQUIRED.to_string(),
                };
                let env_key = resolve_env_key(key, field.source_name(), prefix);
                Some(format!("{}\n{}=\n", comment, env_key))
            }
            Entry::Ephemeral(_) | Entry::Derived(_) => None,
        })
        .collect();
    blocks.join("\n")
}
