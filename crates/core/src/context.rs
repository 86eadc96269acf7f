//! Calculation context: a typed key/value bag passed to strategies.
//!
//! Values are text, decimals, booleans, or nested maps. Extraction is
//! explicit per key and fails loudly on a type mismatch; nothing is coerced.

use std::collections::BTreeMap;

use feecalc_shared::Math;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{FeeError, FeeResult};

/// A single context value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// Free-form text, or a decimal in string form.
    Text(String),
    /// Decimal number.
    Decimal(Decimal),
    /// Boolean flag.
    Bool(bool),
    /// Nested map (composite per-child overrides, component results).
    Map(Context),
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Decimal> for ContextValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Context> for ContextValue {
    fn from(value: Context) -> Self {
        Self::Map(value)
    }
}

/// Ordered string-keyed context map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, ContextValue>);

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// # Example
    ///
    /// ```
    /// use feecalc_core::Context;
    ///
    /// let context = Context::new()
    ///     .with("cross_border", true)
    ///     .with("additional_percentage", "0.01");
    /// assert!(context.flag("cross_border").unwrap());
    /// ```
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.0.remove(key)
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.0.get(key)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns a copy of `self` with every entry of `overlay` on top.
    #[must_use]
    pub fn merged(&self, overlay: &Self) -> Self {
        let mut merged = self.clone();
        for (key, value) in &overlay.0 {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Extracts a decimal value.
    ///
    /// Accepts decimals and decimal strings; any other type is an error.
    pub fn decimal(&self, key: &str) -> FeeResult<Option<Decimal>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(ContextValue::Decimal(value)) => Ok(Some(*value)),
            Some(ContextValue::Text(text)) => Math::parse(text)
                .map(Some)
                .map_err(|_| invalid(key, "a numeric string")),
            Some(_) => Err(invalid(key, "a numeric string")),
        }
    }

    /// Extracts a decimal value or falls back to `default`.
    pub fn decimal_or(&self, key: &str, default: Decimal) -> FeeResult<Decimal> {
        Ok(self.decimal(key)?.unwrap_or(default))
    }

    /// Extracts a boolean flag; a missing key reads as `false`.
    pub fn flag(&self, key: &str) -> FeeResult<bool> {
        match self.0.get(key) {
            None => Ok(false),
            Some(ContextValue::Bool(value)) => Ok(*value),
            Some(_) => Err(invalid(key, "a boolean")),
        }
    }

    /// Extracts a nested map.
    pub fn map(&self, key: &str) -> FeeResult<Option<&Self>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(ContextValue::Map(map)) => Ok(Some(map)),
            Some(_) => Err(invalid(key, "a map")),
        }
    }
}

fn invalid(key: &str, expected: &'static str) -> FeeError {
    FeeError::InvalidContextValue {
        key: key.to_string(),
        expected,
    }
}

impl<K: Into<String>, V: Into<ContextValue>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl TryFrom<serde_json::Value> for Context {
    type Error = FeeError;

    /// Converts a JSON object.
    ///
    /// Numbers become decimals from their exact textual form; `null` and
    /// arrays are rejected.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(object) => convert_object(None, object),
            _ => Err(invalid("<root>", "a JSON object")),
        }
    }
}

/// Converts object entries, reporting errors under the dotted path from the root.
fn convert_object(parent: Option<&str>, object: serde_json::Map<String, serde_json::Value>) -> FeeResult<Context> {
    object
        .into_iter()
        .map(|(key, value)| {
            let path = match parent {
                Some(parent) => format!("{parent}.{key}"),
                None => key.clone(),
            };
            let converted = convert_json(&path, value)?;
            Ok((key, converted))
        })
        .collect::<FeeResult<BTreeMap<_, _>>>()
        .map(Context)
}

fn convert_json(path: &str, value: serde_json::Value) -> FeeResult<ContextValue> {
    match value {
        serde_json::Value::String(text) => Ok(ContextValue::Text(text)),
        serde_json::Value::Bool(flag) => Ok(ContextValue::Bool(flag)),
        serde_json::Value::Number(number) => Math::parse(&number.to_string())
            .map(ContextValue::Decimal)
            .map_err(|_| invalid(path, "a plain decimal number")),
        serde_json::Value::Object(object) => convert_object(Some(path), object).map(ContextValue::Map),
        serde_json::Value::Null | serde_json::Value::Array(_) => {
            Err(invalid(path, "text, a decimal, a boolean, or a map"))
        }
    }
}
