//! # Collection Queries
//!
//! A not-yet-executed scan over a point-in-time snapshot of a collection.
//! Composition happens through the [`Queryable`] operations; nothing runs
//! until [`Query::run`] is called.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::{Predicate, Projection, Queryable, SortKey};

use super::matcher;

#[derive(Debug, Clone)]
pub struct Query {
    docs: Vec<Value>,
    predicates: Vec<Predicate>,
    sort_keys: Vec<SortKey>,
    projection: Option<Projection>,
    hidden: Vec<String>,
    skip: usize,
    take: Option<usize>,
}

impl Query {
    pub(crate) fn new(docs: Vec<Value>, hidden: Vec<String>) -> Self {
        Self {
            docs,
            predicates: Vec::new(),
            sort_keys: Vec::new(),
            projection: None,
            hidden,
            skip: 0,
            take: None,
        }
    }

    /// Executes the composed stages and yields the matching documents.
    ///
    /// Predicates are ANDed, the sort is stable, and collection-hidden
    /// fields are stripped last so no projection can resurface them.
    pub fn run(self) -> Vec<Value> {
        let mut docs: Vec<Value> = self
            .docs
            .into_iter()
            .filter(|doc| self.predicates.iter().all(|p| matcher::matches(doc, p)))
            .collect();

        sort_documents(&mut docs, &self.sort_keys);

        let paged = docs.into_iter().skip(self.skip);
        let paged: Vec<Value> = match self.take {
            Some(count) => paged.take(count).collect(),
            None => paged.collect(),
        };

        paged
            .into_iter()
            .map(|doc| strip_fields(project(doc, self.projection.as_ref()), &self.hidden))
            .collect()
    }
}

impl Queryable for Query {
    fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    fn sort(mut self, keys: Vec<SortKey>) -> Self {
        self.sort_keys = keys;
        self
    }

    fn select(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    fn skip(mut self, count: usize) -> Self {
        self.skip = count;
        self
    }

    fn limit(mut self, count: usize) -> Self {
        self.take = Some(count);
        self
    }
}

fn sort_documents(docs: &mut [Value], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for key in keys {
            let ordering = compare_for_sort(a.get(&key.field), b.get(&key.field));
            let ordering = if key.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Total order for sorting: missing < null < bool < number < string; values
/// of the same type compare naturally.
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a, b),
    };

    let rank = |value: &Value| -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    };
    if rank(a) != rank(b) {
        return rank(a).cmp(&rank(b));
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn project(doc: Value, projection: Option<&Projection>) -> Value {
    let Some(projection) = projection else {
        return doc;
    };
    let Value::Object(obj) = doc else {
        return doc;
    };

    let filtered = match projection {
        // Allow-lists always retain the document identity.
        Projection::Include(fields) => obj
            .into_iter()
            .filter(|(key, _)| key == "_id" || fields.contains(key))
            .collect(),
        Projection::Exclude(fields) => obj
            .into_iter()
            .filter(|(key, _)| !fields.contains(key))
            .collect(),
    };
    Value::Object(filtered)
}

fn strip_fields(doc: Value, hidden: &[String]) -> Value {
    if hidden.is_empty() {
        return doc;
    }
    let Value::Object(obj) = doc else {
        return doc;
    };
    Value::Object(
        obj.into_iter()
            .filter(|(key, _)| !hidden.contains(key))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn docs() -> Vec<Value> {
        vec![
            json!({"_id": "a", "name": "Sea Explorer", "price": 497, "_version": 1}),
            json!({"_id": "b", "name": "Forest Hiker", "price": 397, "_version": 1}),
            json!({"_id": "c", "name": "Snow Adventurer", "price": 997, "_version": 2}),
        ]
    }

    fn predicate(value: Value) -> Predicate {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_run_without_stages_returns_everything() {
        let results = Query::new(docs(), Vec::new()).run();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_filters_are_anded_across_calls() {
        let results = Query::new(docs(), Vec::new())
            .filter(predicate(json!({"price": {"$gte": "400"}})))
            .filter(predicate(json!({"price": {"$lt": "600"}})))
            .run();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["_id"], "a");
    }

    #[test]
    fn test_sort_then_paginate() {
        let results = Query::new(docs(), Vec::new())
            .sort(vec![SortKey::asc("price")])
            .skip(1)
            .limit(1)
            .run();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["price"], 497);
    }

    #[test]
    fn test_multi_key_sort_breaks_ties_in_order() {
        let docs = vec![
            json!({"_id": "a", "price": 400, "name": "b"}),
            json!({"_id": "b", "price": 400, "name": "a"}),
            json!({"_id": "c", "price": 300, "name": "z"}),
        ];

        let results = Query::new(docs, Vec::new())
            .sort(vec![SortKey::desc("price"), SortKey::asc("name")])
            .run();

        let ids: Vec<_> = results.iter().map(|d| d["_id"].clone()).collect();
        assert_eq!(ids, vec![json!("b"), json!("a"), json!("c")]);
    }

    #[test]
    fn test_include_projection_keeps_id() {
        let results = Query::new(docs(), Vec::new())
            .select(Projection::Include(vec!["name".to_string()]))
            .run();

        let keys: Vec<_> = results[0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["_id".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_exclude_projection_drops_only_listed_fields() {
        let results = Query::new(docs(), Vec::new())
            .select(Projection::Exclude(vec!["_version".to_string()]))
            .run();

        for doc in &results {
            let obj = doc.as_object().unwrap();
            assert!(!obj.contains_key("_version"));
            assert!(obj.contains_key("_id"));
            assert!(obj.contains_key("name"));
            assert!(obj.contains_key("price"));
        }
    }

    #[test]
    fn test_hidden_fields_survive_include_projection() {
        let docs = vec![json!({"_id": "a", "email": "x@y.io", "password": "hash"})];

        let results = Query::new(docs, vec!["password".to_string()])
            .select(Projection::Include(vec![
                "email".to_string(),
                "password".to_string(),
            ]))
            .run();

        assert!(!results[0].as_object().unwrap().contains_key("password"));
    }

    #[test]
    fn test_skip_past_end_is_empty() {
        let results = Query::new(docs(), Vec::new()).skip(10).limit(5).run();
        assert!(results.is_empty());
    }
}
