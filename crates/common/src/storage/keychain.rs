//! Platform keychain storage backend
//!
//! Thin wrapper over `keyring` so session secrets live in the OS credential
//! store (macOS Keychain, Windows Credential Manager, Linux Secret Service)
//! rather than on disk.
//!
//! ```no_run
//! use authenhub_common::storage::{KeychainStore, KeyValueStore};
//!
//! let keychain = KeychainStore::new("AuthenHub.session");
//! keychain.set("token", "eyJhbGciOi...")?;
//! assert!(keychain.get("token")?.is_some());
//! # Ok::<(), authenhub_common::storage::StorageError>(())
//! ```

use keyring::Entry;
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError, StorageResult};

/// Entry written and read back by [`KeychainStore::is_persistent`].
const PERSISTENCE_CHECK_KEY: &str = "__authenhub_persistence_check";

/// Keychain-backed [`KeyValueStore`]; each key is one keychain entry under
/// the configured service name.
#[derive(Debug, Clone)]
pub struct KeychainStore {
    service_name: String,
}

impl KeychainStore {
    /// Create a store for a specific service (e.g. `"AuthenHub.session"`).
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Whether values written here can be read back through a fresh entry.
    ///
    /// Without a native credential store `keyring` keeps each value inside
    /// the `Entry` that wrote it, so nothing would survive a restart.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        let marker = "persisted";
        let written = self.set(PERSISTENCE_CHECK_KEY, marker);
        let read_back = self.get(PERSISTENCE_CHECK_KEY);
        if let Err(err) = self.remove(PERSISTENCE_CHECK_KEY) {
            debug!(error = %err, "Failed to remove keychain persistence marker");
        }

        match (written, read_back) {
            (Ok(()), Ok(Some(value))) if value == marker => true,
            (Err(err), _) | (_, Err(err)) => {
                warn!(service = %self.service_name, error = %err, "Keychain unavailable");
                false
            }
            _ => {
                warn!(service = %self.service_name, "Keychain does not persist values");
                false
            }
        }
    }

    fn entry(&self, key: &str) -> StorageResult<Entry> {
        Entry::new(&self.service_name, key).map_err(|e| {
            StorageError::AccessFailed(format!("Failed to open keychain entry {key}: {e}"))
        })
    }
}

impl KeyValueStore for KeychainStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        debug!(service = %self.service_name, key = %key, "Reading keychain entry");

        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::AccessFailed(format!(
                "Failed to read keychain entry {key}: {e}"
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        debug!(service = %self.service_name, key = %key, "Writing keychain entry");

        self.entry(key)?.set_password(value).map_err(|e| {
            StorageError::AccessFailed(format!("Failed to write keychain entry {key}: {e}"))
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        debug!(service = %self.service_name, key = %key, "Deleting keychain entry");

        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::AccessFailed(format!(
                "Failed to delete keychain entry {key}: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> String {
        format!("AuthenHub.test.{}", std::process::id())
    }

    #[test]
    #[ignore = "requires a platform credential store"]
    fn values_survive_a_fresh_store() {
        let service = service();
        KeychainStore::new(service.as_str()).set("token", "abc").unwrap();

        let reopened = KeychainStore::new(service.as_str());
        assert!(reopened.is_persistent());
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc"));

        reopened.remove("token").unwrap();
        assert!(reopened.get("token").unwrap().is_none());
    }

    #[test]
    fn persistence_check_leaves_no_marker() {
        let store = KeychainStore::new(service());

        // Either answer is valid off-platform; the marker must be gone afterwards.
        let _ = store.is_persistent();

        assert!(matches!(store.get(PERSISTENCE_CHECK_KEY), Ok(None) | Err(_)));
    }
}
