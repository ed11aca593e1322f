//! Integration tests for storage backends

#![cfg(feature = "runtime")]

use std::sync::Arc;
use std::thread;

use authenhub_common::storage::{FileStore, KeyValueStore, MemoryStore};
use tempfile::TempDir;

fn exercise(store: &dyn KeyValueStore) {
    assert_eq!(store.get("token").expect("get"), None);

    store.set("token", "a").expect("set");
    store.set("token", "b").expect("overwrite");
    store.set("oauth_state", "nonce").expect("set second key");

    assert_eq!(store.get("token").expect("get").as_deref(), Some("b"));
    store.remove("token").expect("remove");
    store.remove("token").expect("remove is idempotent");
    assert_eq!(store.get("token").expect("get"), None);
    assert_eq!(store.get("oauth_state").expect("get").as_deref(), Some("nonce"));
}

/// Validates that every backend honours the same contract.
#[test]
fn test_backends_share_contract() {
    let dir = TempDir::new().expect("temp dir");

    exercise(&MemoryStore::new());
    exercise(&FileStore::new(dir.path().join("store.json")));
}

/// Validates that concurrent writers never corrupt the file document.
///
/// Assertions:
/// - Every key written by every thread is readable afterwards
/// - A fresh instance parses the file cleanly
#[test]
fn test_file_store_concurrent_writes() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("store.json");
    let store = Arc::new(FileStore::new(&path));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for j in 0..10 {
                    store.set(&format!("key-{i}-{j}"), &format!("{i}:{j}")).expect("set");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    let reopened = FileStore::new(&path);
    for i in 0..8 {
        for j in 0..10 {
            assert_eq!(
                reopened.get(&format!("key-{i}-{j}")).expect("get").as_deref(),
                Some(format!("{i}:{j}").as_str())
            );
        }
    }
}
