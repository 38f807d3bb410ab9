/// Record store tests over durable file storage
///
/// These verify that collections written by one store instance are read back
/// intact by another, and that mutations only touch the intended record.

use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use taskpad_shared::{
    models::task::{NewTask, Task},
    storage::{FileStorage, Storage},
    store::{RecordStore, StoreError},
};
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> RecordStore<Task> {
    RecordStore::new(Arc::new(FileStorage::open(dir.path()).unwrap()))
}

fn patch(value: JsonValue) -> Map<String, JsonValue> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_collection_persists_across_instances() {
    let dir = TempDir::new().unwrap();

    let first = file_store(&dir);
    let a = first.insert(Task::from_new("user-1", NewTask::titled("A"))).unwrap();
    let b = first.insert(Task::from_new("user-2", NewTask::titled("B"))).unwrap();
    assert_ne!(a.id, b.id);

    let second = file_store(&dir);
    let all = second.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "A");
    assert_eq!(all[1].title, "B");
    assert_eq!(second.get_by_id(&b.id).unwrap().unwrap().user_id, "user-2");
}

#[test]
fn test_update_merges_and_keeps_other_records() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);

    let a = store.insert(Task::from_new("user-1", NewTask::titled("A"))).unwrap();
    let b = store.insert(Task::from_new("user-1", NewTask::titled("B"))).unwrap();

    let updated = store
        .update(&a.id, patch(json!({ "completed": true, "category": "work" })))
        .unwrap()
        .unwrap();
    assert!(updated.completed);
    assert_eq!(updated.category, "work");
    assert_eq!(updated.title, "A");
    assert_eq!(updated.id, a.id);

    let untouched = store.get_by_id(&b.id).unwrap().unwrap();
    assert_eq!(serde_json::to_value(&untouched).unwrap(), serde_json::to_value(&b).unwrap());
}

#[test]
fn test_update_with_wrong_type_is_rejected_and_not_written() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    let task = store.insert(Task::from_new("user-1", NewTask::titled("A"))).unwrap();

    let result = store.update(&task.id, patch(json!({ "completed": "yes" })));
    assert!(matches!(result, Err(StoreError::InvalidPatch(_))));

    assert!(!file_store(&dir).get_by_id(&task.id).unwrap().unwrap().completed);
}

#[test]
fn test_missing_ids_are_reported_not_errors() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);

    assert!(store.get_by_id("nope").unwrap().is_none());
    assert!(store.update("nope", Map::new()).unwrap().is_none());
    assert!(!store.delete("nope").unwrap());
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_corrupt_collection_is_an_error() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    storage.set_item("tasks", "{ not a list").unwrap();

    let store: RecordStore<Task> = RecordStore::new(Arc::new(storage));
    assert!(matches!(store.get_all(), Err(StoreError::Corrupt { .. })));
}

#[test]
fn test_filter_and_find_by() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);

    store.insert(Task::from_new("user-1", NewTask::titled("A"))).unwrap();
    store.insert(Task::from_new("user-2", NewTask::titled("B"))).unwrap();
    store.insert(Task::from_new("user-1", NewTask::titled("C"))).unwrap();

    let mine = store.filter(|task| task.is_owned_by("user-1")).unwrap();
    assert_eq!(mine.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), ["A", "C"]);

    let found = store.find_by("title", &json!("B")).unwrap().unwrap();
    assert_eq!(found.user_id, "user-2");
    assert!(store.find_by("title", &json!("Z")).unwrap().is_none());
}
