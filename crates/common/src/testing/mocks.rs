//! Failure-injecting storage

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};

/// [`KeyValueStore`] that can be switched into a failing state.
///
/// Starts failing; call [`FailingStore::recover`] to let operations through
/// to an inner [`MemoryStore`]. Single keys can be kept failing with
/// [`FailingStore::fail_key`]. Counts attempted operations either way.
#[derive(Debug, Clone)]
pub struct FailingStore {
    inner: MemoryStore,
    failing: Arc<AtomicBool>,
    failing_keys: Arc<Mutex<HashSet<String>>>,
    attempts: Arc<AtomicUsize>,
}

impl FailingStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: Arc::new(AtomicBool::new(true)),
            failing_keys: Arc::new(Mutex::new(HashSet::new())),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Let operations succeed from now on.
    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }

    /// Make operations fail from now on.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Make operations on `key` fail regardless of the global state.
    pub fn fail_key(&self, key: &str) {
        self.failing_keys.lock().insert(key.to_string());
    }

    /// Operations attempted so far.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Backing map, bypassing failure injection.
    #[must_use]
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, key: &str) -> StorageResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) || self.failing_keys.lock().contains(key) {
            Err(StorageError::AccessFailed("storage unavailable (injected)".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.check(key)?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check(key)?;
        self.inner.remove(key)
    }
}
