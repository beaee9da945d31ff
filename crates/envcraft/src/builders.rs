//! Field constructors for common value types.
//!
//! Each builder returns a required `Field` whose parse function rejects
//! malformed input with a `CoercionError` naming what was expected.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

use crate::constants::{DEFAULT_ARRAY_SEPARATOR, FALSE_TOKENS, TRUE_TOKENS};
use crate::error::CoercionError;
use crate::field::Field;

/// Raw text, unchanged.
pub fn string() -> Field<String> {
    Field::new(|raw| Ok(raw.to_string()))
}

/// Any numeric type parsed with `FromStr` after trimming whitespace.
///
/// Infinite and NaN values are rejected, whether parsed or given as a default.
pub fn number<N>() -> Field<N>
where
    N: FromStr + Serialize + 'static,
    N::Err: Display,
{
    Field::new(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoercionError::new("expected a number, got an empty value"));
        }
        trimmed
            .parse()
            .map_err(|e: N::Err| CoercionError::new(format!("expected a number: {}", e)))
    })
    .check(|n: &N| match serde_json::to_value(n) {
        Ok(Value::Number(_)) => Ok(()),
        _ => Err(CoercionError::new("expected a finite number")),
    })
}

/// `true/1/yes/on` or `false/0/no/off`, case-insensitive.
pub fn boolean() -> Field<bool> {
    Field::new(|raw| {
        let token = raw.trim().to_ascii_lowercase();
        if TRUE_TOKENS.contains(&token.as_str()) {
            Ok(true)
        } else if FALSE_TOKENS.contains(&token.as_str()) {
            Ok(false)
        } else {
            Err(CoercionError::new(format!(
                "expected one of {} or {}",
                TRUE_TOKENS.join("/"),
                FALSE_TOKENS.join("/")
            )))
        }
    })
}

/// Comma-separated list; items are trimmed and empty items dropped.
pub fn array() -> Field<Vec<String>> {
    array_with(DEFAULT_ARRAY_SEPARATOR)
}

/// Like [`array`] with a custom separator.
pub fn array_with(separator: char) -> Field<Vec<String>> {
    Field::new(move |raw| {
        Ok(raw
            .split(separator)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect())
    })
}

/// Structured JSON text deserialized into `T`.
pub fn json<T>() -> Field<T>
where
    T: DeserializeOwned + Serialize + 'static,
{
    Field::new(|raw| {
        serde_json::from_str(raw).map_err(|e| CoercionError::new(format!("invalid JSON: {}", e)))
    })
}

/// An absolute URL, stored in normalised form.
pub fn url() -> Field<String> {
    Field::new(|raw| {
        ::url::Url::parse(raw.trim())
            .map(String::from)
            .map_err(|e| CoercionError::new(format!("invalid URL: {}", e)))
    })
}

/// A field with a caller-supplied parse function.
pub fn custom<T, F>(coerce: F) -> Field<T>
where
    F: Fn(&str) -> Result<T, CoercionError> + Send + Sync + 'static,
{
    Field::new(coerce)
}
