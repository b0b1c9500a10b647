//! # Raw Query Parameters
//!
//! Read-only view of a request's decoded query string, as handed over by the
//! HTTP layer. Repeated keys collapse into [`ParamValue::Many`] in arrival
//! order; the pipeline only ever reads from this structure.

use std::collections::BTreeMap;

use serde_json::Value;

/// A single query parameter: one occurrence or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// First occurrence of the value.
    pub fn first(&self) -> &str {
        match self {
            ParamValue::Single(value) => value,
            ParamValue::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// JSON form: a string for single values, an array for repeats.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Single(value) => Value::String(value.clone()),
            ParamValue::Many(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }

    fn push(&mut self, value: String) {
        match self {
            ParamValue::Single(first) => {
                *self = ParamValue::Many(vec![std::mem::take(first), value]);
            }
            ParamValue::Many(values) => values.push(value),
        }
    }
}

/// Decoded query-string parameters keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuery {
    params: BTreeMap<String, ParamValue>,
}

impl RawQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects decoded `key=value` pairs, folding repeated keys together.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: BTreeMap<String, ParamValue> = BTreeMap::new();
        for (key, value) in pairs {
            let value = value.into();
            match params.entry(key.into()) {
                std::collections::btree_map::Entry::Vacant(entry) => {
                    entry.insert(ParamValue::Single(value));
                }
                std::collections::btree_map::Entry::Occupied(mut entry) => {
                    entry.get_mut().push(value);
                }
            }
        }
        Self { params }
    }

    /// First occurrence of a parameter, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(ParamValue::first)
    }

    /// Iterates every parameter in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }
}
