//! # Predicate Derivation
//!
//! Builds a collection predicate from request parameters: reserved control
//! keys are dropped, and bracketed comparison suffixes (`duration[gte]=5`)
//! are rewritten to their operator-prefixed form (`duration: {"$gte": "5"}`).

use serde_json::{Map, Value};

use super::request::RawQuery;

/// Control keys that steer presentation and paging, not data predicates.
pub const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// Comparison operators accepted as bracketed key suffixes.
const COMPARISON_OPS: [&str; 4] = ["gte", "gt", "lte", "lt"];

/// Field-to-condition mapping in the store's query language.
pub type Predicate = Map<String, Value>;

/// Derives a predicate from every non-reserved parameter.
///
/// The input is never mutated. An input with only reserved keys yields an
/// empty predicate, which matches every document.
pub fn build_predicate(raw: &RawQuery) -> Predicate {
    let mut predicate = Predicate::new();

    for (key, value) in raw.iter() {
        let (field, suffix) = split_bracket_key(key);
        if RESERVED_KEYS.contains(&field) {
            continue;
        }

        let value = value.to_json();
        match suffix {
            None => {
                predicate.insert(field.to_string(), value);
            }
            Some(op) => {
                // Only whole operator tokens are rewritten; any other
                // bracketed key passes through verbatim.
                let condition = if COMPARISON_OPS.contains(&op) {
                    format!("${op}")
                } else {
                    op.to_string()
                };
                match predicate.get_mut(field).and_then(Value::as_object_mut) {
                    Some(conditions) => {
                        conditions.insert(condition, value);
                    }
                    None => {
                        let mut conditions = Map::new();
                        conditions.insert(condition, value);
                        predicate.insert(field.to_string(), Value::Object(conditions));
                    }
                }
            }
        }
    }

    predicate
}

/// Splits `duration[gte]` into `("duration", Some("gte"))`; keys without a
/// well-formed bracket suffix come back whole.
fn split_bracket_key(key: &str) -> (&str, Option<&str>) {
    if let Some(open) = key.find('[') {
        if let Some(inner) = key[open + 1..].strip_suffix(']') {
            if !inner.is_empty() {
                return (&key[..open], Some(inner));
            }
        }
    }
    (key, None)
}
