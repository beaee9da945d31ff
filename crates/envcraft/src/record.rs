//! Resolved configuration records.
//!
//! Responsibilities:
//! - Hold resolved values in schema order, keyed by schema key.
//! - Distinguish a resolved value from an intentionally absent one.
//! - Provide typed reads and whole-record deserialization into user structs.
//!
//! Does NOT handle:
//! - Resolution itself (see `loader`).
//!
//! Invariants:
//! - A key with no entry has not been resolved; `Slot::Absent` means it was
//!   resolved to nothing (optional field or skip-missing).
//! - A `Record` handed to derived functions is never mutated afterwards.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Resolution outcome for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Value(Value),
    Absent,
}

impl Slot {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Slot::Value(value) => Some(value),
            Slot::Absent => None,
        }
    }
}

/// Ordered mapping from schema key to resolved slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Slot)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the slot for `key`, keeping its original position.
    pub(crate) fn insert(&mut self, key: impl Into<String>, slot: Slot) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => *existing = slot,
            None => self.entries.push((key, slot)),
        }
    }

    pub fn slot(&self, key: &str) -> Option<&Slot> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, slot)| slot)
    }

    /// True if `key` was resolved, including to absent.
    pub fn contains(&self, key: &str) -> bool {
        self.slot(key).is_some()
    }

    pub fn is_absent(&self, key: &str) -> bool {
        matches!(self.slot(key), Some(Slot::Absent))
    }

    /// Read `key` as `T`.
    ///
    /// Returns `Ok(None)` when the key is absent or was never resolved.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.slot(key).and_then(Slot::as_value) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::ValueType {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Read `key` as `T`, failing if it has no value.
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        self.get(key)?.ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.entries.iter().map(|(key, slot)| (key.as_str(), slot))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a JSON object; absent slots become `null`.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, slot)| (key.clone(), slot.as_value().cloned().unwrap_or(Value::Null)))
            .collect();
        Value::Object(map)
    }

    /// Deserialize the whole record into a user type.
    ///
    /// Absent values deserialize as `null`, so they map onto `Option` fields.
    pub fn deserialize<C: DeserializeOwned>(&self) -> Result<C, ConfigError> {
        serde_json::from_value(self.to_json()).map_err(|e| ConfigError::Deserialize {
            message: e.to_string(),
        })
    }
}
