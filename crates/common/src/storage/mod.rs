//! Durable client-side key/value storage
//!
//! The session layer keeps a handful of string values across process
//! restarts: the access token, the refresh token and the outstanding OAuth
//! nonce. [`KeyValueStore`] is the seam; the backends are:
//!
//! - [`MemoryStore`]: process memory, for tests and ephemeral sessions
//! - [`FileStore`]: one JSON document on disk, replaced atomically
//! - `KeychainStore` (`platform` feature): the OS credential store

pub mod error;
pub mod file;
#[cfg(feature = "platform")]
pub mod keychain;
pub mod memory;

use std::sync::Arc;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
#[cfg(feature = "platform")]
pub use keychain::KeychainStore;
pub use memory::MemoryStore;

/// String-keyed durable storage.
///
/// Implementations are synchronous: every call completes before it returns,
/// so a value written by one caller is visible to the next.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value. Removing an absent key succeeds.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend cannot be written.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
