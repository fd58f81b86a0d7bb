// src/payload.rs
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::LazyLock;

use crate::schema::{FieldKind, FormSchema};

/// Longest numeric prefix accepted by a browser's `parseFloat`.
static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)").expect("valid float prefix regex")
});

/// Parses the leading numeric prefix of `raw`, ignoring leading whitespace and
/// any trailing garbage. Returns `None` where a browser would yield `NaN`.
pub fn parse_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let prefix = FLOAT_PREFIX.find(trimmed)?.as_str();
    prefix.parse::<f64>().ok()
}

/// `parseFloat(raw) || 0`: unparsable input and both zeros become `0`.
pub fn coerce_numeric(raw: &str) -> f64 {
    match parse_float(raw) {
        Some(value) if value != 0.0 && !value.is_nan() => value,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Number(f64),
    Text(String),
}

impl Serialize for PayloadValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Mirrors JSON.stringify: whole numbers without a fraction, non-finite as null.
        const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
        match self {
            PayloadValue::Text(text) => serializer.serialize_str(text),
            PayloadValue::Number(n) if !n.is_finite() => serializer.serialize_none(),
            PayloadValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE => {
                serializer.serialize_i64(*n as i64)
            }
            PayloadValue::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

/// Request body for `POST /predict`, keyed by field name in form order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    entries: Vec<(String, PayloadValue)>,
}

impl FormPayload {
    /// Builds the payload from raw form entries, converting names the schema
    /// classifies as numeric and passing every other value through untouched.
    pub fn from_entries<I, K, V>(entries: I, schema: &FormSchema) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut payload = FormPayload::default();
        for (name, raw) in entries {
            let name = name.into();
            let value = match schema.kind_of(&name) {
                FieldKind::Numeric => PayloadValue::Number(coerce_numeric(raw.as_ref())),
                FieldKind::Text => PayloadValue::Text(raw.as_ref().to_string()),
            };
            payload.insert(name, value);
        }
        payload
    }

    /// A repeated name keeps its first position and takes the latest value.
    pub fn insert(&mut self, name: String, value: PayloadValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PayloadValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for FormPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
