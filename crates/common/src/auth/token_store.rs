//! Access/refresh token store
//!
//! Single source of truth for the credential attached to outgoing requests.
//! Values are cached in memory and written through to a [`KeyValueStore`] so
//! they survive restarts.
//!
//! Storage failures never surface as errors: a read that fails yields `None`,
//! a write that fails leaves the token absent. Either way the session reads
//! as logged out, which is the safe degradation for a credential store.

use std::sync::Arc;

use authenhub_domain::constants::{REFRESH_TOKEN_KEY, TOKEN_KEY};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

#[derive(Debug, Default)]
struct Cached {
    loaded: bool,
    access: Option<String>,
    refresh: Option<String>,
}

/// Durable token store with an in-memory cache.
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
    access_key: String,
    refresh_key: String,
    cache: RwLock<Cached>,
}

impl TokenStore {
    /// Store tokens under the default `token` / `refresh_token` keys.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            access_key: TOKEN_KEY.to_string(),
            refresh_key: REFRESH_TOKEN_KEY.to_string(),
            cache: RwLock::new(Cached::default()),
        }
    }

    /// Prefix both keys with `namespace.`, e.g. one store per backend.
    #[must_use]
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.access_key = format!("{namespace}.{TOKEN_KEY}");
        self.refresh_key = format!("{namespace}.{REFRESH_TOKEN_KEY}");
        self
    }

    /// Current access token, reading durable storage on first access.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.ensure_loaded();
        self.cache.read().access.clone()
    }

    /// Current refresh token, if one is tracked.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.ensure_loaded();
        self.cache.read().refresh.clone()
    }

    /// Whether an access token is held.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.get().is_some()
    }

    /// Persist and cache the access token.
    ///
    /// Returns `false` when durable storage rejected the write; the store
    /// then holds no access token at all.
    pub fn set(&self, token: &str) -> bool {
        self.ensure_loaded();
        let mut cache = self.cache.write();
        match self.storage.set(&self.access_key, token) {
            Ok(()) => {
                cache.access = Some(token.to_string());
                debug!("Access token stored");
                true
            }
            Err(err) => {
                warn!(error = %err, "Failed to persist access token, session is logged out");
                cache.access = None;
                false
            }
        }
    }

    /// Persist, replace or (with `None`) remove the refresh token.
    ///
    /// Returns `false` when durable storage rejected the change.
    pub fn set_refresh_token(&self, token: Option<&str>) -> bool {
        self.ensure_loaded();
        let mut cache = self.cache.write();
        let result = match token {
            Some(value) => self.storage.set(&self.refresh_key, value),
            None => self.storage.remove(&self.refresh_key),
        };
        match result {
            Ok(()) => {
                cache.refresh = token.map(str::to_string);
                true
            }
            Err(err) => {
                warn!(error = %err, "Failed to persist refresh token");
                cache.refresh = None;
                false
            }
        }
    }

    /// Remove both tokens from storage and memory.
    ///
    /// Memory is always cleared, even if the durable delete fails.
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        for key in [&self.access_key, &self.refresh_key] {
            if let Err(err) = self.storage.remove(key) {
                warn!(key = %key, error = %err, "Failed to remove token from storage");
            }
        }
        *cache = Cached { loaded: true, access: None, refresh: None };
        debug!("Tokens cleared");
    }

    /// Drop the in-memory cache without touching durable storage; the next
    /// read goes back to storage.
    pub fn forget_cached(&self) {
        *self.cache.write() = Cached::default();
    }

    fn ensure_loaded(&self) {
        if self.cache.read().loaded {
            return;
        }

        let mut cache = self.cache.write();
        if cache.loaded {
            return;
        }

        let access = match self.storage.get(&self.access_key) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "Token storage unavailable; treating session as logged out");
                return;
            }
        };
        let refresh = self.storage.get(&self.refresh_key).unwrap_or_else(|err| {
            warn!(error = %err, "Failed to read refresh token");
            None
        });

        debug!(has_access = access.is_some(), has_refresh = refresh.is_some(), "Tokens loaded");
        *cache = Cached { loaded: true, access, refresh };
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.read();
        f.debug_struct("TokenStore")
            .field("access_key", &self.access_key)
            .field("loaded", &cache.loaded)
            .field("has_access", &cache.access.is_some())
            .field("has_refresh", &cache.refresh.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::FailingStore;

    #[test]
    fn reads_persisted_token_lazily() {
        let storage = MemoryStore::new();
        storage.set(TOKEN_KEY, "persisted").unwrap();
        storage.set(REFRESH_TOKEN_KEY, "refresh").unwrap();

        let store = TokenStore::new(Arc::new(storage));

        assert_eq!(store.get().as_deref(), Some("persisted"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh"));
    }

    #[test]
    fn set_is_visible_immediately_and_durable() {
        let storage = MemoryStore::new();
        let store = TokenStore::new(Arc::new(storage.clone()));

        assert!(store.set("fresh"));

        assert_eq!(store.get().as_deref(), Some("fresh"));
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn clear_removes_both_tokens() {
        let storage = MemoryStore::new();
        let store = TokenStore::new(Arc::new(storage.clone()));
        assert!(store.set("a"));
        assert!(store.set_refresh_token(Some("r")));

        store.clear();

        assert!(store.get().is_none());
        assert!(store.refresh_token().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn unavailable_storage_reads_as_logged_out() {
        let store = TokenStore::new(Arc::new(FailingStore::new()));

        assert!(!store.set("token"));
        assert!(store.get().is_none());
        assert!(!store.has_token());
        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn namespace_prefixes_keys() {
        let storage = MemoryStore::new();
        let store = TokenStore::new(Arc::new(storage.clone())).with_namespace("staging");

        assert!(store.set("abc"));

        assert!(storage.contains("staging.token"));
        assert!(!storage.contains(TOKEN_KEY));
    }

    #[test]
    fn forget_cached_rereads_storage() {
        let storage = MemoryStore::new();
        let store = TokenStore::new(Arc::new(storage.clone()));
        assert!(store.set("first"));

        storage.set(TOKEN_KEY, "second").unwrap();
        assert_eq!(store.get().as_deref(), Some("first"));

        store.forget_cached();
        assert_eq!(store.get().as_deref(), Some("second"));
    }
}
