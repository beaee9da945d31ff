//! Declarative configuration schemas.
//!
//! Responsibilities:
//! - Define the three entry kinds: stored fields, ephemeral fields, derived values.
//! - Keep entries in insertion order under unique logical keys.
//!
//! Does NOT handle:
//! - Resolving entries (see `loader`).
//!
//! Invariants:
//! - Keys are unique; inserting an existing key replaces the entry in place.
//! - Derived functions only ever see a frozen `Record` of stored and ephemeral values.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::field::{AnyField, Field};
use crate::record::Record;

/// A field resolved for use by derived entries only; never part of the output.
pub struct Ephemeral<T>(pub Field<T>);

/// Wrap `field` as an ephemeral entry.
pub fn ephemeral<T>(field: Field<T>) -> Ephemeral<T> {
    Ephemeral(field)
}

type DeriveFn = Box<dyn Fn(&Record) -> anyhow::Result<Value> + Send + Sync>;

/// A value computed from the stored and ephemeral values of the same load.
pub struct Derived {
    compute: DeriveFn,
}

impl Derived {
    pub fn new<T, F>(compute: F) -> Self
    where
        T: Serialize + 'static,
        F: Fn(&Record) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            compute: Box::new(move |record: &Record| {
                Ok(serde_json::to_value(compute(record)?)?)
            }),
        }
    }

    pub(crate) fn compute(&self, record: &Record) -> anyhow::Result<Value> {
        (self.compute)(record)
    }
}

/// Build a derived entry from a function over the resolved record.
pub fn derived<T, F>(compute: F) -> Derived
where
    T: Serialize + 'static,
    F: Fn(&Record) -> anyhow::Result<T> + Send + Sync + 'static,
{
    Derived::new(compute)
}

/// One schema entry.
pub enum Entry {
    Stored(AnyField),
    Ephemeral(AnyField),
    Derived(Derived),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Stored(_) => "stored",
            Entry::Ephemeral(_) => "ephemeral",
            Entry::Derived(_) => "derived",
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl<T> From<Field<T>> for Entry
where
    T: Serialize + Send + Sync + 'static,
{
    fn from(field: Field<T>) -> Self {
        Entry::Stored(AnyField::new(field))
    }
}

impl<T> From<Ephemeral<T>> for Entry
where
    T: Serialize + Send + Sync + 'static,
{
    fn from(ephemeral: Ephemeral<T>) -> Self {
        Entry::Ephemeral(AnyField::new(ephemeral.0))
    }
}

impl From<Derived> for Entry {
    fn from(derived: Derived) -> Self {
        Entry::Derived(derived)
    }
}

/// Ordered mapping from logical key to entry.
#[derive(Debug, Default)]
pub struct Schema {
    entries: Vec<(String, Entry)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any existing entry under the same key.
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<Entry>) {
        let key = key.into();
        let entry = entry.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((key, entry)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.insert(key, entry);
        self
    }

    pub fn field<T>(self, key: impl Into<String>, field: Field<T>) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.with(key, field)
    }

    pub fn ephemeral<T>(self, key: impl Into<String>, field: Field<T>) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.with(key, Ephemeral(field))
    }

    pub fn derived<T, F>(self, key: impl Into<String>, compute: F) -> Self
    where
        T: Serialize + 'static,
        F: Fn(&Record) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.with(key, Derived::new(compute))
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{number, string};

    #[test]
    fn test_schema_keeps_insertion_order_and_replaces_in_place() {
        let schema = Schema::new()
            .field("HOST", string())
            .ephemeral("pgPort", number::<u16>())
            .derived("url", |_| Ok("x".to_string()))
            .field("HOST", string().default("localhost".to_string()));

        let kinds: Vec<(&str, String)> = schema
            .iter()
            .map(|(key, entry)| (key, format!("{:?}", entry)))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("HOST", "stored".to_string()),
                ("pgPort", "ephemeral".to_string()),
                ("url", "derived".to_string()),
            ]
        );
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_derived_serializes_result_and_propagates_errors() {
        let ok = derived(|_| Ok(vec![1, 2]));
        assert_eq!(ok.compute(&Record::new()).unwrap(), serde_json::json!([1, 2]));

        let failing = derived::<u8, _>(|_| anyhow::bail!("boom"));
        assert_eq!(failing.compute(&Record::new()).unwrap_err().to_string(), "boom");
    }

    #[test]
    fn test_entry_conversions() {
        assert!(matches!(Entry::from(string()), Entry::Stored(_)));
        assert!(matches!(Entry::from(ephemeral(string())), Entry::Ephemeral(_)));
        assert!(matches!(
            Entry::from(derived(|_| Ok(true))),
            Entry::Derived(_)
        ));
    }
}
