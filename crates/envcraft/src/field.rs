//! Typed field descriptors.
//!
//! Responsibilities:
//! - Define `Field<T>`: a parse function from raw text plus missing-value behavior.
//! - Provide the `default`, `optional`, `from_env` and `check` modifiers.
//! - Erase `Field<T>` behind `AnyField` so heterogeneous fields share one schema.
//!
//! Does NOT handle:
//! - Looking values up in the environment or env file (see `loader`).
//! - Computing external lookup keys (see `naming`).
//!
//! Invariants:
//! - A `Field` is immutable; modifiers consume it and return a new one.
//! - When both a default and optionality are set, the default governs missing values.
//! - Checks run on coerced values and on defaults alike.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::CoercionError;

/// Parse function shared between a field and the fields derived from it by modifiers.
pub type Coercer<T> = Arc<dyn Fn(&str) -> Result<T, CoercionError> + Send + Sync>;

/// Validation applied to every value a field produces.
pub type Checker<T> = Arc<dyn Fn(&T) -> Result<(), CoercionError> + Send + Sync>;

/// Descriptor for one configuration value.
#[derive(Clone)]
pub struct Field<T> {
    coerce: Coercer<T>,
    check: Option<Checker<T>>,
    default: Option<T>,
    optional: bool,
    source_name: Option<String>,
}

impl<T> Field<T> {
    /// Create a required field from a parse function.
    pub fn new<F>(coerce: F) -> Self
    where
        F: Fn(&str) -> Result<T, CoercionError> + Send + Sync + 'static,
    {
        Self {
            coerce: Arc::new(coerce),
            check: None,
            default: None,
            optional: false,
            source_name: None,
        }
    }

    /// Use `value` when no raw value is found. Clears optionality.
    pub fn default(self, value: T) -> Self {
        Self {
            default: Some(value),
            optional: false,
            ..self
        }
    }

    /// Resolve to absent instead of failing when no raw value is found.
    ///
    /// A default set before this call is kept and still takes precedence.
    pub fn optional(self) -> Field<Option<T>>
    where
        T: 'static,
    {
        let inner = self.coerce;
        let check = self.check.map(|check| -> Checker<Option<T>> {
            Arc::new(move |value: &Option<T>| value.as_ref().map_or(Ok(()), |v| check(v)))
        });
        Field {
            coerce: Arc::new(move |raw| inner(raw).map(Some)),
            check,
            default: self.default.map(Some),
            optional: true,
            source_name: self.source_name,
        }
    }

    /// Look the value up under `name` instead of the case-converted schema key.
    pub fn from_env(self, name: impl Into<String>) -> Self {
        Self {
            source_name: Some(name.into()),
            ..self
        }
    }

    /// Reject values for which `check` fails, in addition to any earlier check.
    pub fn check<F>(self, check: F) -> Self
    where
        T: 'static,
        F: Fn(&T) -> Result<(), CoercionError> + Send + Sync + 'static,
    {
        let check: Checker<T> = match self.check {
            Some(earlier) => Arc::new(move |value: &T| {
                earlier(value)?;
                check(value)
            }),
            None => Arc::new(check),
        };
        Self {
            check: Some(check),
            ..self
        }
    }

    /// Run the parse function and any checks on a raw value.
    pub fn coerce(&self, raw: &str) -> Result<T, CoercionError> {
        let value = (self.coerce)(raw)?;
        self.validate(&value)?;
        Ok(value)
    }

    /// Run the field's checks against `value`.
    pub fn validate(&self, value: &T) -> Result<(), CoercionError> {
        match &self.check {
            Some(check) => check(value),
            None => Ok(()),
        }
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }
}

impl<T: fmt::Debug> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("default", &self.default)
            .field("optional", &self.optional)
            .field("source_name", &self.source_name)
            .finish_non_exhaustive()
    }
}

/// Type-erased view of a `Field<T>` used by the schema and the loader.
pub(crate) trait ErasedField: Send + Sync {
    fn source_name(&self) -> Option<&str>;

    fn is_optional(&self) -> bool;

    /// The default rendered as JSON, if one is set.
    fn default_json(&self) -> Option<Result<Value, CoercionError>>;

    fn coerce_json(&self, raw: &str) -> Result<Value, CoercionError>;
}

impl<T> ErasedField for Field<T>
where
    T: Serialize + Send + Sync + 'static,
{
    fn source_name(&self) -> Option<&str> {
        Field::source_name(self)
    }

    fn is_optional(&self) -> bool {
        self.optional
    }

    fn default_json(&self) -> Option<Result<Value, CoercionError>> {
        self.default
            .as_ref()
            .map(|default| self.validate(default).and_then(|()| to_json(default)))
    }

    fn coerce_json(&self, raw: &str) -> Result<Value, CoercionError> {
        to_json(&self.coerce(raw)?)
    }
}

/// A field of any value type, as stored in a schema.
pub struct AnyField(Box<dyn ErasedField>);

impl AnyField {
    pub(crate) fn new<T>(field: Field<T>) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self(Box::new(field))
    }

    pub fn source_name(&self) -> Option<&str> {
        self.0.source_name()
    }

    pub fn is_optional(&self) -> bool {
        self.0.is_optional()
    }

    pub fn has_default(&self) -> bool {
        self.0.default_json().is_some()
    }

    pub(crate) fn default_json(&self) -> Option<Result<Value, CoercionError>> {
        self.0.default_json()
    }

    pub(crate) fn coerce_json(&self, raw: &str) -> Result<Value, CoercionError> {
        self.0.coerce_json(raw)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, CoercionError> {
    serde_json::to_value(value)
        .map_err(|e| CoercionError::new(format!("value cannot be represented: {}", e)))
}
