//! Generic record store over a [`Storage`] key
//!
//! A [`RecordStore`] keeps one collection of flat JSON records under a single
//! storage key. Every operation reads the whole collection, and every mutation
//! serializes the whole collection back. There are no multi-record
//! transactions: two stores sharing a storage key race, and the last writer
//! wins.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use taskpad_shared::models::task::{NewTask, Task};
//! use taskpad_shared::storage::MemoryStorage;
//! use taskpad_shared::store::RecordStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store: RecordStore<Task> = RecordStore::new(Arc::new(MemoryStorage::new()));
//!
//! let task = store.insert(Task::from_new("user-1", NewTask::titled("Buy milk")))?;
//! assert_eq!(store.get_by_id(&task.id)?.map(|t| t.title), Some("Buy milk".to_string()));
//!
//! let mut patch = serde_json::Map::new();
//! patch.insert("completed".to_string(), serde_json::Value::Bool(true));
//! let updated = store.update(&task.id, patch)?.expect("task exists");
//! assert!(updated.completed);
//!
//! assert!(store.delete(&task.id)?);
//! # Ok(())
//! # }
//! ```

use crate::storage::{Storage, StorageError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::{marker::PhantomData, sync::Arc};
use tracing::debug;
use uuid::Uuid;

/// Name of the identifier field in every serialized record
pub const ID_FIELD: &str = "id";

/// Error type for record store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Persisted collection is not valid JSON for this record type
    #[error("Collection '{collection}' is corrupt: {source}")]
    Corrupt {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Record could not be serialized
    #[error("Failed to serialize record: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Patched record no longer fits the record type
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),
}

/// A record that can live in a [`RecordStore`]
///
/// Records serialize as flat JSON objects carrying their identifier under
/// [`ID_FIELD`].
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Storage key of the collection (e.g. `"tasks"`)
    const COLLECTION: &'static str;

    /// Assigned identifier
    fn id(&self) -> &str;

    /// Overwrites the identifier; only the store calls this, on insert
    fn set_id(&mut self, id: String);
}

/// Keyed collection of records persisted as one JSON array
pub struct RecordStore<R> {
    storage: Arc<dyn Storage>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            _record: PhantomData,
        }
    }
}

impl<R: Record> RecordStore<R> {
    /// Creates a store over `storage`, using `R::COLLECTION` as the key
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    /// Returns every record in insertion order
    ///
    /// A missing collection key reads as an empty collection.
    pub fn get_all(&self) -> Result<Vec<R>, StoreError> {
        match self.storage.get_item(R::COLLECTION)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                collection: R::COLLECTION,
                source,
            }),
        }
    }

    /// Finds a record by identifier
    pub fn get_by_id(&self, id: &str) -> Result<Option<R>, StoreError> {
        Ok(self.get_all()?.into_iter().find(|record| record.id() == id))
    }

    /// Returns the first record whose serialized `field` equals `value`
    pub fn find_by(&self, field: &str, value: &JsonValue) -> Result<Option<R>, StoreError> {
        for record in self.get_all()? {
            let json = serde_json::to_value(&record).map_err(StoreError::Serialization)?;
            if json.get(field) == Some(value) {
                return Ok(Some(record));
            }
        }

        Ok(None)
    }

    /// Returns every record matching `predicate`, in insertion order
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<R>, StoreError>
    where
        F: Fn(&R) -> bool,
    {
        Ok(self.get_all()?.into_iter().filter(|r| predicate(r)).collect())
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.get_all()?.len())
    }

    /// Inserts a record under a freshly generated identifier
    ///
    /// Whatever identifier `record` carried is replaced. Identifiers are UUID v4
    /// strings and are never reused.
    pub fn insert(&self, mut record: R) -> Result<R, StoreError> {
        let mut records = self.get_all()?;
        record.set_id(Uuid::new_v4().to_string());
        records.push(record.clone());
        self.save(&records)?;

        debug!(collection = R::COLLECTION, id = record.id(), "Inserted record");
        Ok(record)
    }

    /// Shallow-merges `patch` into the record with `id`
    ///
    /// The `id` key of the patch is ignored. Returns `None` if no record has
    /// that identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPatch` (and writes nothing) if the merged
    /// object no longer deserializes as `R`.
    pub fn update(&self, id: &str, patch: Map<String, JsonValue>) -> Result<Option<R>, StoreError> {
        let mut records = self.get_all()?;
        let Some(slot) = records.iter_mut().find(|record| record.id() == id) else {
            return Ok(None);
        };

        let mut merged = match serde_json::to_value(&*slot).map_err(StoreError::Serialization)? {
            JsonValue::Object(map) => map,
            other => {
                return Err(StoreError::InvalidPatch(format!(
                    "record serialized as {} instead of an object",
                    other
                )))
            }
        };

        for (key, value) in patch {
            if key != ID_FIELD {
                merged.insert(key, value);
            }
        }

        let updated: R = serde_json::from_value(JsonValue::Object(merged))
            .map_err(|e| StoreError::InvalidPatch(e.to_string()))?;
        *slot = updated.clone();
        self.save(&records)?;

        debug!(collection = R::COLLECTION, id, "Updated record");
        Ok(Some(updated))
    }

    /// Replaces a whole record, keeping its identifier
    pub fn replace(&self, record: R) -> Result<Option<R>, StoreError> {
        let mut records = self.get_all()?;
        let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) else {
            return Ok(None);
        };
        *slot = record.clone();
        self.save(&records)?;

        Ok(Some(record))
    }

    /// Deletes the record with `id`
    ///
    /// Returns `true` iff a record was removed.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.get_all()?;
        let before = records.len();
        records.retain(|record| record.id() != id);

        if records.len() == before {
            return Ok(false);
        }

        self.save(&records)?;
        debug!(collection = R::COLLECTION, id, "Deleted record");
        Ok(true)
    }

    fn save(&self, records: &[R]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records).map_err(StoreError::Serialization)?;
        self.storage.set_item(R::COLLECTION, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(default)]
        id: String,
        body: String,
        #[serde(default)]
        pinned: bool,
    }

    impl Record for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    fn note(body: &str) -> Note {
        Note {
            id: String::new(),
            body: body.to_string(),
            pinned: false,
        }
    }

    fn store() -> (Arc<MemoryStorage>, RecordStore<Note>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = RecordStore::new(storage.clone() as Arc<dyn Storage>);
        (storage, store)
    }

    #[test]
    fn test_empty_collection() {
        let (_, store) = store();
        assert!(store.get_all().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_assigns_fresh_ids() {
        let (_, store) = store();
        let mut preset = note("a");
        preset.id = "client-chosen".to_string();

        let a = store.insert(preset).unwrap();
        let b = store.insert(note("b")).unwrap();

        assert_ne!(a.id, "client-chosen");
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_insert_then_get_by_id() {
        let (_, store) = store();
        let inserted = store.insert(note("hello")).unwrap();

        let fetched = store.get_by_id(&inserted.id).unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert!(store.get_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_find_by_field() {
        let (_, store) = store();
        store.insert(note("first")).unwrap();
        let second = store.insert(note("second")).unwrap();

        let found = store.find_by("body", &json!("second")).unwrap().unwrap();
        assert_eq!(found.id, second.id);
        assert!(store.find_by("body", &json!("third")).unwrap().is_none());
        assert!(store.find_by("nonexistent", &json!("first")).unwrap().is_none());
    }

    #[test]
    fn test_update_merges_and_keeps_id() {
        let (_, store) = store();
        let original = store.insert(note("body")).unwrap();

        let patch = json!({ "pinned": true, "id": "hijack" });
        let updated = store
            .update(&original.id, patch.as_object().unwrap().clone())
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert!(updated.pinned);
        assert_eq!(updated.body, "body");
        assert_eq!(store.get_by_id(&original.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn test_update_missing_record() {
        let (_, store) = store();
        assert!(store.update("missing", Map::new()).unwrap().is_none());
    }

    #[test]
    fn test_update_with_wrong_type_writes_nothing() {
        let (_, store) = store();
        let original = store.insert(note("body")).unwrap();

        let patch = json!({ "pinned": "yes" });
        let result = store.update(&original.id, patch.as_object().unwrap().clone());

        assert!(matches!(result, Err(StoreError::InvalidPatch(_))));
        assert_eq!(store.get_by_id(&original.id).unwrap().unwrap(), original);
    }

    #[test]
    fn test_delete() {
        let (_, store) = store();
        let a = store.insert(note("a")).unwrap();
        let b = store.insert(note("b")).unwrap();

        assert!(store.delete(&a.id).unwrap());
        assert!(!store.delete(&a.id).unwrap());

        let remaining = store.get_all().unwrap();
        assert_eq!(remaining, vec![b]);
    }

    #[test]
    fn test_filter_preserves_order() {
        let (_, store) = store();
        for body in ["x1", "y", "x2"] {
            store.insert(note(body)).unwrap();
        }

        let bodies: Vec<String> = store
            .filter(|n| n.body.starts_with('x'))
            .unwrap()
            .into_iter()
            .map(|n| n.body)
            .collect();
        assert_eq!(bodies, vec!["x1", "x2"]);
    }

    #[test]
    fn test_corrupt_collection() {
        let (storage, store) = store();
        storage.set_item("notes", "{not json").unwrap();

        assert!(matches!(
            store.get_all(),
            Err(StoreError::Corrupt { collection: "notes", .. })
        ));
    }

    #[test]
    fn test_every_mutation_rewrites_collection() {
        let (storage, store) = store();
        let a = store.insert(note("a")).unwrap();

        let raw = storage.get_item("notes").unwrap().unwrap();
        let parsed: Vec<Note> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec![a.clone()]);

        store.delete(&a.id).unwrap();
        assert_eq!(storage.get_item("notes").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_replace() {
        let (_, store) = store();
        let mut a = store.insert(note("a")).unwrap();
        a.body = "changed".to_string();

        assert!(store.replace(a.clone()).unwrap().is_some());
        assert_eq!(store.get_by_id(&a.id).unwrap().unwrap().body, "changed");

        let mut ghost = note("ghost");
        ghost.id = "missing".to_string();
        assert!(store.replace(ghost).unwrap().is_none());
    }
}
