//! Expand command: read an env file, interpolate it, print the result.
//!
//! References are resolved against the process environment. Nothing is
//! written back to the environment.
//!
//! Dotenv output reads back to the same values: literal `$` is re-escaped, and
//! values that the reader would trim or unquote are wrapped in double quotes.

use std::path::Path;

use anyhow::Context;
use envcraft::{
    Encoding, EnvFile, EnvironmentGuard, InterpolationOptions, LookupPolicy, MissingPolicy,
    interpolate, read_env_file,
};
use tracing::info;

use crate::args::OutputFormat;

pub fn run(
    file: &Path,
    missing: MissingPolicy,
    lookup: LookupPolicy,
    encoding: Encoding,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let raw = read_env_file(file, encoding)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let options = InterpolationOptions::new()
        .with_missing(missing)
        .with_lookup(lookup);
    let expanded = interpolate(&raw, EnvironmentGuard::process(), &options)
        .with_context(|| format!("failed to expand {}", file.display()))?;

    info!(entries = expanded.len(), %missing, %lookup, "expanded env file");
    print!("{}", render(&expanded, output)?);
    Ok(())
}

pub fn render(file: &EnvFile, output: OutputFormat) -> anyhow::Result<String> {
    match output {
        OutputFormat::Dotenv => Ok(file
            .iter()
            .map(|(key, value)| format!("{}={}\n", key, dotenv_value(value)))
            .collect()),
        OutputFormat::Json => {
            let object: serde_json::Map<String, serde_json::Value> = file
                .iter()
                .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
                .collect();
            let mut text = serde_json::to_string_pretty(&object)?;
            text.push('\n');
            Ok(text)
        }
    }
}

fn dotenv_value(value: &str) -> String {
    let escaped = value.replace('$', "\\$");
    let needs_quotes = value.is_empty()
        || value.contains(|c: char| c.is_whitespace() || c == '#')
        || value.starts_with(['"', '\''])
        || value.ends_with(['"', '\'']);
    if needs_quotes {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}
