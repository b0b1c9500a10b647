//! # Document Collections
//!
//! A named set of JSON documents behind an `RwLock`, with unique-field
//! enforcement, optimistic version bookkeeping and always-hidden fields.
//! Clones share the same underlying documents, so a collection handle can
//! live in shared application state.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use uuid::Uuid;

use crate::query::VERSION_FIELD;

use super::errors::{StoreError, StoreResult};
use super::query::Query;

#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    entity: String,
    unique_fields: Vec<String>,
    hidden_fields: Vec<String>,
    docs: Arc<RwLock<Vec<Value>>>,
}

impl Collection {
    /// Creates an empty collection; `entity` is the singular used in error
    /// messages (`"tour"` for the `"tours"` collection).
    pub fn new(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            unique_fields: Vec::new(),
            hidden_fields: Vec::new(),
            docs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Declares a unique field, enforced on insert and update.
    pub fn with_unique(mut self, field: &str) -> Self {
        self.unique_fields.push(field.to_string());
        self
    }

    /// Declares a field that is stripped from every read result.
    pub fn with_hidden(mut self, field: &str) -> Self {
        self.hidden_fields.push(field.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a document, assigning `_id` and the initial version.
    pub fn insert(&self, mut doc: Value) -> StoreResult<Value> {
        {
            let obj = doc
                .as_object_mut()
                .ok_or_else(|| StoreError::Internal("document must be an object".to_string()))?;
            obj.insert("_id".to_string(), Value::String(Uuid::new_v4().to_string()));
            obj.insert(VERSION_FIELD.to_string(), Value::from(1u64));
        }

        let mut docs = self.write()?;
        self.ensure_unique(&docs, &doc, None)?;
        docs.push(doc.clone());
        Ok(self.conceal(doc))
    }

    /// Fetches one document by id, hidden fields stripped.
    pub fn get(&self, id: &str) -> StoreResult<Value> {
        let id = self.parse_id(id)?;
        let docs = self.read()?;
        docs.iter()
            .find(|doc| doc_id(doc) == Some(id.as_str()))
            .cloned()
            .map(|doc| self.conceal(doc))
            .ok_or_else(|| self.not_found())
    }

    /// Shallow-merges a patch into the document and bumps its version.
    ///
    /// `_id` and the version field are not client-writable.
    pub fn update(&self, id: &str, patch: Value) -> StoreResult<Value> {
        let id = self.parse_id(id)?;
        let patch = match patch {
            Value::Object(map) => map,
            _ => return Err(StoreError::Internal("patch must be an object".to_string())),
        };

        let mut docs = self.write()?;
        let index = docs
            .iter()
            .position(|doc| doc_id(doc) == Some(id.as_str()))
            .ok_or_else(|| self.not_found())?;

        let mut merged = docs[index].clone();
        if let Some(obj) = merged.as_object_mut() {
            for (key, value) in patch {
                if key == "_id" || key == VERSION_FIELD {
                    continue;
                }
                obj.insert(key, value);
            }
            let version = obj.get(VERSION_FIELD).and_then(Value::as_u64).unwrap_or(0);
            obj.insert(VERSION_FIELD.to_string(), Value::from(version + 1));
        }

        self.ensure_unique(&docs, &merged, Some(id.as_str()))?;
        docs[index] = merged.clone();
        Ok(self.conceal(merged))
    }

    /// Removes one document by id.
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let id = self.parse_id(id)?;
        let mut docs = self.write()?;
        let before = docs.len();
        docs.retain(|doc| doc_id(doc) != Some(id.as_str()));
        if docs.len() == before {
            return Err(self.not_found());
        }
        Ok(())
    }

    /// Exact-value lookup for internal flows (login, token checks).
    ///
    /// Returns the raw document, hidden fields included; responses must go
    /// through [`Collection::conceal`] or a query instead.
    pub fn find_one_by(&self, field: &str, value: &Value) -> StoreResult<Option<Value>> {
        let docs = self.read()?;
        Ok(docs.iter().find(|doc| doc.get(field) == Some(value)).cloned())
    }

    /// Raw lookup by an arbitrary condition, same caveats as
    /// [`Collection::find_one_by`].
    pub fn find_one_where<F>(&self, condition: F) -> StoreResult<Option<Value>>
    where
        F: Fn(&Value) -> bool,
    {
        let docs = self.read()?;
        Ok(docs.iter().find(|doc| condition(doc)).cloned())
    }

    /// Starts a query over a point-in-time snapshot of the collection.
    pub fn query(&self) -> StoreResult<Query> {
        let docs = self.read()?;
        Ok(Query::new(docs.clone(), self.hidden_fields.clone()))
    }

    /// Strips the collection's hidden fields from a document.
    pub fn conceal(&self, doc: Value) -> Value {
        if self.hidden_fields.is_empty() {
            return doc;
        }
        let Value::Object(obj) = doc else {
            return doc;
        };
        Value::Object(
            obj.into_iter()
                .filter(|(key, _)| !self.hidden_fields.contains(key))
                .collect(),
        )
    }

    fn ensure_unique(
        &self,
        docs: &[Value],
        candidate: &Value,
        skip_id: Option<&str>,
    ) -> StoreResult<()> {
        for field in &self.unique_fields {
            let Some(value) = candidate.get(field) else {
                continue;
            };
            let clash = docs.iter().any(|existing| {
                existing.get(field) == Some(value)
                    && skip_id.map_or(true, |skip| doc_id(existing) != Some(skip))
            });
            if clash {
                return Err(StoreError::Duplicate {
                    field: field.clone(),
                    value: display_value(value),
                });
            }
        }
        Ok(())
    }

    fn parse_id(&self, raw: &str) -> StoreResult<String> {
        Uuid::parse_str(raw)
            .map(|id| id.to_string())
            .map_err(|_| StoreError::Cast {
                path: "_id".to_string(),
                value: raw.to_string(),
            })
    }

    fn not_found(&self) -> StoreError {
        StoreError::NotFound {
            entity: self.entity.clone(),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<Value>>> {
        self.docs
            .read()
            .map_err(|_| StoreError::Internal("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<Value>>> {
        self.docs
            .write()
            .map_err(|_| StoreError::Internal("lock poisoned".to_string()))
    }
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("_id").and_then(Value::as_str)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_assigns_id_and_version() {
        let tours = Collection::new("tours", "tour");

        let doc = tours.insert(json!({"name": "The Forest Hiker"})).unwrap();

        assert!(Uuid::parse_str(doc["_id"].as_str().unwrap()).is_ok());
        assert_eq!(doc[VERSION_FIELD], 1);
        assert_eq!(tours.len(), 1);
    }

    #[test]
    fn test_unique_field_rejects_duplicates() {
        let users = Collection::new("users", "user").with_unique("email");
        users.insert(json!({"email": "a@b.io"})).unwrap();

        let err = users.insert(json!({"email": "a@b.io"})).unwrap_err();

        match err {
            StoreError::Duplicate { field, value } => {
                assert_eq!(field, "email");
                assert_eq!(value, "a@b.io");
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_get_with_malformed_id_is_cast_error() {
        let tours = Collection::new("tours", "tour");

        let err = tours.get("definitely-not-a-uuid").unwrap_err();

        assert!(matches!(err, StoreError::Cast { ref path, .. } if path == "_id"));
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let tours = Collection::new("tours", "tour");
        let id = Uuid::new_v4().to_string();

        let err = tours.get(&id).unwrap_err();

        assert!(matches!(err, StoreError::NotFound { ref entity } if entity == "tour"));
    }

    #[test]
    fn test_update_merges_and_bumps_version() {
        let tours = Collection::new("tours", "tour");
        let doc = tours
            .insert(json!({"name": "The Forest Hiker", "price": 397}))
            .unwrap();
        let id = doc["_id"].as_str().unwrap();

        let updated = tours.update(id, json!({"price": 497})).unwrap();

        assert_eq!(updated["price"], 497);
        assert_eq!(updated["name"], "The Forest Hiker");
        assert_eq!(updated[VERSION_FIELD], 2);
    }

    #[test]
    fn test_update_cannot_rewrite_bookkeeping_fields() {
        let tours = Collection::new("tours", "tour");
        let doc = tours.insert(json!({"name": "The Forest Hiker"})).unwrap();
        let id = doc["_id"].as_str().unwrap();

        let updated = tours
            .update(id, json!({"_id": "forged", VERSION_FIELD: 99}))
            .unwrap();

        assert_eq!(updated["_id"].as_str().unwrap(), id);
        assert_eq!(updated[VERSION_FIELD], 2);
    }

    #[test]
    fn test_update_keeps_unique_check_but_allows_self() {
        let users = Collection::new("users", "user").with_unique("email");
        let first = users.insert(json!({"email": "a@b.io"})).unwrap();
        users.insert(json!({"email": "c@d.io"})).unwrap();
        let id = first["_id"].as_str().unwrap();

        // Re-asserting its own value is fine.
        assert!(users.update(id, json!({"email": "a@b.io"})).is_ok());
        // Taking another document's value is not.
        let err = users.update(id, json!({"email": "c@d.io"})).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[test]
    fn test_delete_removes_document() {
        let tours = Collection::new("tours", "tour");
        let doc = tours.insert(json!({"name": "The Forest Hiker"})).unwrap();
        let id = doc["_id"].as_str().unwrap().to_string();

        tours.delete(&id).unwrap();

        assert!(tours.is_empty());
        assert!(matches!(
            tours.delete(&id).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_hidden_fields_never_leave_reads() {
        let users = Collection::new("users", "user").with_hidden("password");
        let inserted = users
            .insert(json!({"email": "a@b.io", "password": "argon2-hash"}))
            .unwrap();
        assert!(inserted.get("password").is_none());

        let id = inserted["_id"].as_str().unwrap();
        let fetched = users.get(id).unwrap();
        assert!(fetched.get("password").is_none());

        // Raw lookup deliberately keeps it for credential checks.
        let raw = users
            .find_one_by("email", &json!("a@b.io"))
            .unwrap()
            .unwrap();
        assert_eq!(raw["password"], "argon2-hash");
    }

    #[test]
    fn test_clones_share_documents() {
        let tours = Collection::new("tours", "tour");
        let handle = tours.clone();

        tours.insert(json!({"name": "The Forest Hiker"})).unwrap();

        assert_eq!(handle.len(), 1);
    }

    #[test]
    fn test_query_is_a_snapshot() {
        let tours = Collection::new("tours", "tour");
        tours.insert(json!({"name": "The Forest Hiker"})).unwrap();

        let query = tours.query().unwrap();
        tours.insert(json!({"name": "The Sea Explorer"})).unwrap();

        assert_eq!(query.run().len(), 1);
    }
}
