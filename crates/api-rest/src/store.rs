//! In-memory collections backing the development server.
//!
//! Records are kept as raw JSON exactly as the hospital backend would return them; typed decoding
//! happens in the route handlers, per resource.

use crate::error::ApiError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Collection path to stored records.
pub type Seed = HashMap<String, Vec<Value>>;

#[derive(Debug, Default)]
pub struct Store {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from seed records. Records without an id are given one.
    pub fn from_seed(seed: Seed) -> Self {
        let collections = seed
            .into_iter()
            .map(|(path, records)| {
                let path = path.trim_matches('/').to_string();
                let records = records.into_iter().map(ensure_id).collect();
                (path, records)
            })
            .collect();

        Self {
            collections: RwLock::new(collections),
        }
    }

    /// Load seed records from a YAML file keyed by collection path.
    pub fn load_seed(path: &Path) -> Result<Self, ApiError> {
        let text = std::fs::read_to_string(path).map_err(ApiError::SeedRead)?;
        let seed: Seed = serde_yaml::from_str(&text).map_err(ApiError::SeedParse)?;
        let total: usize = seed.values().map(Vec::len).sum();
        tracing::info!("seeded {} records from {}", total, path.display());
        Ok(Self::from_seed(seed))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Value>>> {
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Value>>> {
        self.collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn list(&self, collection: &str) -> Vec<Value> {
        self.read().get(collection).cloned().unwrap_or_default()
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.read()
            .get(collection)?
            .iter()
            .find(|r| record_id(r) == Some(id))
            .cloned()
    }

    pub fn insert(&self, collection: &str, record: Value) {
        self.write()
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Edit the record with `id` while holding the write lock, so a check made inside `edit`
    /// still holds when its result is stored. The record is only replaced when `edit` succeeds.
    ///
    /// Returns `None` if there is no such record.
    pub fn modify<T, E>(
        &self,
        collection: &str,
        id: &str,
        edit: impl FnOnce(&mut Value) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut collections = self.write();
        let slot = collections
            .get_mut(collection)?
            .iter_mut()
            .find(|r| record_id(r) == Some(id))?;
        let mut edited = slot.clone();
        Some(edit(&mut edited).map(|out| {
            *slot = edited;
            out
        }))
    }

    pub fn remove(&self, collection: &str, id: &str) -> bool {
        let mut collections = self.write();
        let Some(records) = collections.get_mut(collection) else {
            return false;
        };
        let before = records.len();
        records.retain(|r| record_id(r) != Some(id));
        records.len() != before
    }
}

/// The record's `id`, falling back to `_id`.
pub fn record_id(record: &Value) -> Option<&str> {
    record
        .get("id")
        .or_else(|| record.get("_id"))
        .and_then(Value::as_str)
}

/// Copy every field of `patch` except `id` onto `target`.
pub fn merge(target: &mut Map<String, Value>, patch: &Value) {
    if let Value::Object(fields) = patch {
        for (key, value) in fields {
            if key != "id" && key != "_id" {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn ensure_id(mut record: Value) -> Value {
    if record_id(&record).is_none() {
        if let Value::Object(map) = &mut record {
            map.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
    }
    record
}
