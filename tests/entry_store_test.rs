use caller_shell::store::{is_unset, Entry, EntryStore, SqliteStorage, Storage};
use caller_shell::Error;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Helper to create a temp directory for tests
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

async fn open_store(dir: &TempDir) -> EntryStore {
    let storage = SqliteStorage::open(dir.path().join("storage")).await.unwrap();
    EntryStore::from_storage(Arc::new(storage))
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let temp_dir = create_test_dir();
    let store = open_store(&temp_dir).await;

    let payloads = [
        json!("hello"),
        json!(42),
        json!({"nested": {"list": [1, 2, 3]}}),
        json!([true, null]),
        Value::Null,
    ];
    for (i, data) in payloads.iter().enumerate() {
        let id = format!("entry-{}", i);
        let saved = store
            .save(Entry::new(&id, "note", data.clone()))
            .await
            .unwrap();
        let loaded = store.load(&id).await.unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(&loaded.data, data);
        assert_eq!(loaded.entry_type, "note");
        assert!(loaded.created_at <= loaded.updated_at);
    }
}

#[tokio::test]
async fn test_created_at_survives_overwrite() {
    let temp_dir = create_test_dir();
    let store = open_store(&temp_dir).await;

    let first = store.save(Entry::new("a", "note", json!(1))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = store.save(Entry::new("a", "note", json!(2))).await.unwrap();

    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(store.load("a").await.unwrap().data, json!(2));
}

#[tokio::test]
async fn test_explicit_created_at_is_kept() {
    let temp_dir = create_test_dir();
    let store = open_store(&temp_dir).await;

    let mut entry = Entry::new("imported", "note", json!("x"));
    entry.created_at = chrono::DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let saved = store.save(entry.clone()).await.unwrap();

    assert_eq!(saved.created_at, entry.created_at);
    assert!(!is_unset(&saved.updated_at));
}

#[tokio::test]
async fn test_overwrite_cannot_replace_first_created_at() {
    let temp_dir = create_test_dir();
    let store = open_store(&temp_dir).await;

    let first = store.save(Entry::new("a", "note", json!(1))).await.unwrap();

    let mut rewrite = Entry::new("a", "note", json!(2));
    rewrite.created_at = chrono::DateTime::parse_from_rfc3339("2001-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let second = store.save(rewrite).await.unwrap();

    assert_eq!(second.created_at, first.created_at);
    let loaded = store.load("a").await.unwrap();
    assert_eq!(loaded.created_at, first.created_at);
    assert_eq!(loaded.data, json!(2));
    assert!(loaded.created_at <= loaded.updated_at);
}

#[tokio::test]
async fn test_delete_then_load_is_not_found() {
    let temp_dir = create_test_dir();
    let store = open_store(&temp_dir).await;

    store.save(Entry::new("a", "note", json!("x"))).await.unwrap();
    store.delete("a").await.unwrap();
    assert!(store.load("a").await.unwrap_err().is_not_found());

    // Never saved: delete is still fine, load still NotFound.
    store.delete("never-saved").await.unwrap();
    assert!(matches!(
        store.load("never-saved").await,
        Err(Error::NotFound(ref id)) if id == "never-saved"
    ));
}

#[tokio::test]
async fn test_list_is_ordered_by_id() {
    let temp_dir = create_test_dir();
    let store = open_store(&temp_dir).await;

    for id in ["charlie", "alpha", "bravo"] {
        store.save(Entry::new(id, "note", json!(id))).await.unwrap();
    }

    let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["alpha", "bravo", "charlie"]);
}

#[tokio::test]
async fn test_entries_persist_across_reopen() {
    let temp_dir = create_test_dir();

    let storage = SqliteStorage::open(temp_dir.path().join("storage")).await.unwrap();
    let saved = storage
        .save(Entry::new("forward_url", "config", json!("http://10.0.0.1:8080")))
        .await
        .unwrap();
    storage.close().await.unwrap();

    let reopened = SqliteStorage::open(temp_dir.path().join("storage")).await.unwrap();
    assert_eq!(reopened.load("forward_url").await.unwrap(), saved);
    assert_eq!(reopened.location(), Some(temp_dir.path().join("storage").as_path()));
}

#[tokio::test]
async fn test_directory_is_opened_exclusively() {
    let temp_dir = create_test_dir();
    let dir = temp_dir.path().join("storage");

    let first = SqliteStorage::open(&dir).await.unwrap();
    let second = SqliteStorage::open(&dir).await;

    match second {
        Err(e @ Error::StoreLocked(_)) => assert!(e.suggestion().is_some()),
        Err(other) => panic!("expected StoreLocked, got {:?}", other),
        Ok(_) => panic!("second open of a locked directory succeeded"),
    }

    first.close().await.unwrap();
    SqliteStorage::open(&dir).await.unwrap();
}

#[tokio::test]
async fn test_close_is_idempotent_and_final() {
    let temp_dir = create_test_dir();
    let store = open_store(&temp_dir).await;

    store.close().await.unwrap();
    store.close().await.unwrap();

    assert!(matches!(store.list().await, Err(Error::StoreClosed)));
    assert!(matches!(store.delete("a").await, Err(Error::StoreClosed)));
}
