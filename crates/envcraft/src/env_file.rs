//! `.env` file reading.
//!
//! Responsibilities:
//! - Read an env file from disk in a chosen text encoding.
//! - Parse `KEY=value` lines into an ordered flat map.
//!
//! Does NOT handle:
//! - Interpolation or escape processing (see `interpolate`).
//! - Writing values into the process environment.
//!
//! Invariants:
//! - A missing file yields an empty map and a warning, never an error.
//! - Errors NEVER include raw file contents, only the path and error kind.
//! - Blank lines, `#` comments and lines without `=` are skipped.
//! - The first `=` splits key from value; matching outer quotes are stripped.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::constants::{COMMENT_PREFIX, EXPORT_PREFIX, KEY_VALUE_SEPARATOR};
use crate::error::ConfigError;

/// Text encoding used to decode an env file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD.
    Utf8Lossy,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
}

impl Encoding {
    fn decode(self, bytes: Vec<u8>, path: &Path) -> Result<String, ConfigError> {
        match self {
            Encoding::Utf8 => {
                String::from_utf8(bytes).map_err(|_| ConfigError::EnvFileEncoding {
                    path: path.to_path_buf(),
                    encoding: self.to_string(),
                })
            }
            Encoding::Utf8Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Encoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Utf8 => "utf8",
            Encoding::Utf8Lossy => "utf8-lossy",
            Encoding::Latin1 => "latin1",
        })
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf8-lossy" | "utf-8-lossy" => Ok(Encoding::Utf8Lossy),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Encoding::Latin1),
            other => Err(format!("unsupported encoding: {}", other)),
        }
    }
}

/// Ordered flat mapping from external key to raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; an existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvFile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut file = EnvFile::new();
        for (key, value) in iter {
            file.insert(key, value);
        }
        file
    }
}

/// Parse env file text into an ordered map.
pub fn parse_env_str(text: &str) -> EnvFile {
    let mut file = EnvFile::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }
        let line = line.strip_prefix(EXPORT_PREFIX).unwrap_or(line);
        let Some((key, value)) = line.split_once(KEY_VALUE_SEPARATOR) else {
            debug!(line = index + 1, "skipping env file line without '='");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            debug!(line = index + 1, "skipping env file line with empty key");
            continue;
        }
        file.insert(key, strip_quotes(value.trim()));
    }
    file
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Read and parse the env file at `path`.
///
/// A missing file is not an error: it yields an empty map.
pub fn read_env_file(path: &Path, encoding: Encoding) -> Result<EnvFile, ConfigError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "env file not found, continuing without it");
            return Ok(EnvFile::new());
        }
        Err(e) => {
            return Err(ConfigError::EnvFileRead {
                path: path.to_path_buf(),
                kind: e.kind(),
            });
        }
    };
    let file = parse_env_str(&encoding.decode(bytes, path)?);
    debug!(path = %path.display(), entries = file.len(), "read env file");
    Ok(file)
}
