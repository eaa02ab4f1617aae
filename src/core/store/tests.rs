//! Unit tests for the storage backends

use super::*;
use tempfile::tempdir;

fn exercise(store: &mut dyn KeyValueStore) {
    assert_eq!(store.get("inquiry_drafts").unwrap(), None);
    assert!(store.keys().unwrap().is_empty());

    store.put("inquiry_drafts", "[]").unwrap();
    store.put("favorite_products", "[1]").unwrap();
    store.put("inquiry_drafts", "[2]").unwrap();

    assert_eq!(store.get("inquiry_drafts").unwrap().as_deref(), Some("[2]"));
    assert_eq!(
        store.keys().unwrap(),
        vec!["favorite_products".to_string(), "inquiry_drafts".to_string()]
    );

    store.remove("inquiry_drafts").unwrap();
    store.remove("inquiry_drafts").unwrap();
    assert_eq!(store.get("inquiry_drafts").unwrap(), None);
    assert_eq!(store.keys().unwrap(), vec!["favorite_products".to_string()]);
}

#[test]
fn test_memory_store() {
    let mut store = MemoryStore::new();
    exercise(&mut store);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_json_file_store() {
    let tmp = tempdir().unwrap();
    let mut store = JsonFileStore::open(tmp.path().join("state")).unwrap();
    exercise(&mut store);

    assert!(store.dir().join("favorite_products.json").exists());
    // no temp files left behind
    let leftovers: Vec<_> = std::fs::read_dir(store.dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_json_file_store_survives_reopen() {
    let tmp = tempdir().unwrap();
    {
        let mut store = JsonFileStore::open(tmp.path()).unwrap();
        store.put("company_templates", "[\"acme\"]").unwrap();
    }
    let store = JsonFileStore::open(tmp.path()).unwrap();
    assert_eq!(
        store.get("company_templates").unwrap().as_deref(),
        Some("[\"acme\"]")
    );
}

#[test]
fn test_sqlite_store() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    exercise(&mut store);
}

#[test]
fn test_sqlite_store_survives_reopen() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("inquiry.db");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        store.put("inquiry_history", "[]").unwrap();
    }
    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.get("inquiry_history").unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_invalid_keys_rejected() {
    let mut store = MemoryStore::new();
    for key in ["", "../escape", "Upper", "with space"] {
        assert!(matches!(
            store.put(key, "[]"),
            Err(StoreError::InvalidKey(_))
        ));
    }
}

#[test]
fn test_sqlite_store_non_utf8_value() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("inquiry.db");
    drop(SqliteStore::open(&path).unwrap());
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute(
            "INSERT INTO collections (key, value, updated) VALUES ('inquiry_drafts', CAST(X'FFFE' AS TEXT), '')",
            [],
        )
        .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert!(matches!(
        store.get("inquiry_drafts"),
        Err(StoreError::InvalidEncoding { .. })
    ));
}
