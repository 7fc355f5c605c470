//! Sub-records: the string/number maps a session accumulates per transaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder stored for optional free-text fields the customer skipped.
pub const NOT_PROVIDED: &str = "Not Provided";

/// A single sub-record value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// String-keyed map of values collected across the steps of one transaction
/// (a quote request, a booking or a price offer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubRecord(BTreeMap<String, FieldValue>);

impl SubRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Text value for `key`; numbers are not coerced.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(FieldValue::as_text)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(FieldValue::as_number)
    }

    /// Text value for `key`, or [`NOT_PROVIDED`].
    pub fn display(&self, key: &str) -> String {
        self.0
            .get(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_PROVIDED.to_string())
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), FieldValue::Text(value.into()));
    }

    /// Store a number. Non-finite values cannot be serialized and are dropped.
    pub fn set_number(&mut self, key: impl Into<String>, value: f64) {
        if value.is_finite() {
            self.0.insert(key.into(), FieldValue::Number(value));
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}
