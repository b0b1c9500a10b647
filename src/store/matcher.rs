//! # Predicate Matching
//!
//! Evaluates a derived predicate against one document. Operands that arrive
//! from a query string are strings, so comparisons coerce between numeric
//! strings and numbers before falling back to lexicographic order.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::Predicate;

/// Whether `doc` satisfies every clause of `predicate`.
///
/// An empty predicate matches every document.
pub fn matches(doc: &Value, predicate: &Predicate) -> bool {
    predicate
        .iter()
        .all(|(field, condition)| field_matches(doc.get(field), condition))
}

fn field_matches(actual: Option<&Value>, condition: &Value) -> bool {
    match condition {
        Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => ops
            .iter()
            .all(|(op, operand)| op_matches(actual, op, operand)),
        _ => match actual {
            Some(actual) => values_equal(actual, condition),
            None => false,
        },
    }
}

fn op_matches(actual: Option<&Value>, op: &str, operand: &Value) -> bool {
    match op {
        "$ne" => match actual {
            Some(actual) => !values_equal(actual, operand),
            None => true,
        },
        "$in" => match (actual, operand.as_array()) {
            (Some(actual), Some(list)) => list.iter().any(|v| values_equal(actual, v)),
            _ => false,
        },
        "$gte" | "$gt" | "$lte" | "$lt" => {
            let ordering = match actual.and_then(|actual| compare(actual, operand)) {
                Some(ordering) => ordering,
                None => return false,
            };
            match op {
                "$gte" => ordering != Ordering::Less,
                "$gt" => ordering == Ordering::Greater,
                "$lte" => ordering != Ordering::Greater,
                _ => ordering == Ordering::Less,
            }
        }
        // Unknown operators never match.
        _ => false,
    }
}

/// Equality with numeric and boolean coercion.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    if let (Some(x), Some(y)) = (numeric(a), numeric(b)) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (boolean(a), boolean(b)) {
        return x == y;
    }
    false
}

/// Ordering with the same coercion as equality; `None` when incomparable.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (numeric(a), numeric(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn predicate(value: Value) -> Predicate {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_empty_predicate_matches_all() {
        assert!(matches(&json!({"any": 1}), &Predicate::new()));
    }

    #[test]
    fn test_equality_clause() {
        let p = predicate(json!({"difficulty": "easy"}));

        assert!(matches(&json!({"difficulty": "easy"}), &p));
        assert!(!matches(&json!({"difficulty": "medium"}), &p));
        assert!(!matches(&json!({}), &p));
    }

    #[test]
    fn test_numeric_string_operand_coerces() {
        // Query-string operands are strings; document values are numbers.
        let p = predicate(json!({"duration": {"$gte": "5"}}));

        assert!(matches(&json!({"duration": 5}), &p));
        assert!(matches(&json!({"duration": 7.5}), &p));
        assert!(!matches(&json!({"duration": 4}), &p));
    }

    #[test]
    fn test_comparison_operators() {
        let doc = json!({"price": 400});

        assert!(matches(&doc, &predicate(json!({"price": {"$gt": "399"}}))));
        assert!(!matches(&doc, &predicate(json!({"price": {"$gt": "400"}}))));
        assert!(matches(&doc, &predicate(json!({"price": {"$lte": "400"}}))));
        assert!(matches(&doc, &predicate(json!({"price": {"$lt": "401"}}))));
        assert!(!matches(&doc, &predicate(json!({"price": {"$lt": "400"}}))));
    }

    #[test]
    fn test_ne_treats_missing_as_different() {
        let p = predicate(json!({"secret_tour": {"$ne": true}}));

        assert!(matches(&json!({"secret_tour": false}), &p));
        assert!(matches(&json!({}), &p));
        assert!(!matches(&json!({"secret_tour": true}), &p));
    }

    #[test]
    fn test_in_operator() {
        let p = predicate(json!({"difficulty": {"$in": ["easy", "medium"]}}));

        assert!(matches(&json!({"difficulty": "medium"}), &p));
        assert!(!matches(&json!({"difficulty": "difficult"}), &p));
    }

    #[test]
    fn test_two_conditions_on_one_field_are_anded() {
        let p = predicate(json!({"duration": {"$gte": "5", "$lte": "9"}}));

        assert!(matches(&json!({"duration": 7}), &p));
        assert!(!matches(&json!({"duration": 4}), &p));
        assert!(!matches(&json!({"duration": 10}), &p));
    }

    #[test]
    fn test_unknown_operator_never_matches() {
        let p = predicate(json!({"duration": {"$regex": "5"}}));

        assert!(!matches(&json!({"duration": 5}), &p));
    }

    #[test]
    fn test_boolean_string_coerces() {
        let p = predicate(json!({"active": "true"}));

        assert!(matches(&json!({"active": true}), &p));
        assert!(!matches(&json!({"active": false}), &p));
    }
}
