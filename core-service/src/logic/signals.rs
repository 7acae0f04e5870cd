//! Signal Record
//!
//! Merged, partial mapping of raw source output for one target.
//! An absent key means "unknown"; downstream consumers read it as zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One scalar reported by a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SignalValue {
    /// Lenient numeric view: bools are 0/1, numeric strings parse, everything
    /// else (null, free text, NaN) has no numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            SignalValue::Null => return None,
            SignalValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            SignalValue::Int(i) => *i as f64,
            SignalValue::Float(f) => *f,
            SignalValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|v| v.round() as i64)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SignalValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            SignalValue::Text(s) => {
                let s = s.trim().to_lowercase();
                matches!(s.as_str(), "true" | "yes")
                    || s.parse::<f64>().map(|v| v != 0.0).unwrap_or(false)
            }
            other => other.as_f64().map(|v| v != 0.0).unwrap_or(false),
        }
    }
}

impl From<bool> for SignalValue {
    fn from(v: bool) -> Self {
        SignalValue::Bool(v)
    }
}

impl From<i64> for SignalValue {
    fn from(v: i64) -> Self {
        SignalValue::Int(v)
    }
}

impl From<u32> for SignalValue {
    fn from(v: u32) -> Self {
        SignalValue::Int(v as i64)
    }
}

impl From<usize> for SignalValue {
    fn from(v: usize) -> Self {
        SignalValue::Int(v as i64)
    }
}

impl From<f64> for SignalValue {
    fn from(v: f64) -> Self {
        SignalValue::Float(v)
    }
}

impl From<&str> for SignalValue {
    fn from(v: &str) -> Self {
        SignalValue::Text(v.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(v: String) -> Self {
        SignalValue::Text(v)
    }
}

/// Ordered so serialized records are reproducible
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalRecord(BTreeMap<String, SignalValue>);

impl SignalRecord {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SignalValue>) -> Option<SignalValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SignalValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SignalValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Numeric value, absent/unparseable → 0
    pub fn number(&self, key: &str) -> f64 {
        self.get(key).and_then(SignalValue::as_f64).unwrap_or(0.0)
    }

    /// Integer value, absent/unparseable → 0
    pub fn int(&self, key: &str) -> i64 {
        self.get(key).and_then(SignalValue::as_i64).unwrap_or(0)
    }

    /// Text value, absent or non-text → None
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SignalValue::as_text)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SignalValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, SignalValue)> for SignalRecord {
    fn from_iter<I: IntoIterator<Item = (String, SignalValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SignalRecord {
    type Item = (String, SignalValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, SignalValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
