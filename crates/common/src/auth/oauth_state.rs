//! OAuth anti-forgery state handshake
//!
//! Before redirecting to an identity provider the client issues a random
//! nonce and persists it with its issue time. When the provider redirects
//! back, [`OAuthStateHandshake::verify`] consumes the stored state: it is
//! deleted on every verification, successful or not, so a nonce can never be
//! replayed.
//!
//! Only one handshake is outstanding at a time; issuing a new nonce replaces
//! the previous one.

use std::sync::Arc;
use std::time::Duration;

use authenhub_domain::constants::{OAUTH_STATE_KEY, OAUTH_STATE_TIME_KEY};
use tracing::{debug, warn};

use crate::security::{constant_time_eq, generate_token, DEFAULT_TOKEN_BYTES};
use crate::storage::{KeyValueStore, StorageResult};
use crate::time::{Clock, SystemClock};

/// How long an issued nonce stays valid.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Issues and verifies one-time OAuth state nonces.
pub struct OAuthStateHandshake {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl OAuthStateHandshake {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage, clock: Arc::new(SystemClock), ttl: DEFAULT_STATE_TTL }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a nonce, persist it with the current time and return it.
    ///
    /// # Errors
    /// Returns the storage error if the nonce could not be persisted; a
    /// redirect started without a stored nonce could never verify.
    pub fn issue(&self) -> StorageResult<String> {
        let nonce = generate_token(DEFAULT_TOKEN_BYTES);
        let issued_at = self.clock.millis_since_epoch();

        self.storage.set(OAUTH_STATE_KEY, &nonce)?;
        self.storage.set(OAUTH_STATE_TIME_KEY, &issued_at.to_string())?;

        debug!(issued_at, "OAuth state issued");
        Ok(nonce)
    }

    /// Consume the stored state and check it against `returned`.
    ///
    /// Returns `false` when no nonce was returned, nothing was stored, the
    /// nonces differ, the stored time is unreadable or the window elapsed.
    #[must_use]
    pub fn verify(&self, returned: Option<&str>) -> bool {
        let stored = self.read(OAUTH_STATE_KEY);
        let issued_at = self.read(OAUTH_STATE_TIME_KEY);
        self.discard();

        let Some(returned) = returned.filter(|value| !value.is_empty()) else {
            debug!("OAuth state missing from callback");
            return false;
        };
        let Some(stored) = stored else {
            debug!("No outstanding OAuth state");
            return false;
        };
        if !constant_time_eq(&stored, returned) {
            warn!("OAuth state mismatch");
            return false;
        }
        let Some(issued_at) = issued_at.and_then(|raw| raw.trim().parse::<i64>().ok()) else {
            warn!("OAuth state time unreadable");
            return false;
        };

        let age_ms = self.clock.millis_since_epoch().saturating_sub(issued_at);
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        if age_ms > ttl_ms {
            debug!(age_ms, ttl_ms, "OAuth state expired");
            return false;
        }

        true
    }

    /// Whether a handshake is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.read(OAUTH_STATE_KEY).is_some()
    }

    fn read(&self, key: &str) -> Option<String> {
        self.storage.get(key).unwrap_or_else(|err| {
            warn!(key = %key, error = %err, "Failed to read OAuth state");
            None
        })
    }

    fn discard(&self) {
        for key in [OAUTH_STATE_KEY, OAUTH_STATE_TIME_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(key = %key, error = %err, "Failed to clear OAuth state");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::MockClock;

    fn handshake() -> (OAuthStateHandshake, MemoryStore, MockClock) {
        let storage = MemoryStore::new();
        let clock = MockClock::new();
        let handshake = OAuthStateHandshake::new(Arc::new(storage.clone()))
            .with_clock(Arc::new(clock.clone()));
        (handshake, storage, clock)
    }

    #[test]
    fn verify_succeeds_exactly_once() {
        let (handshake, storage, _) = handshake();
        let nonce = handshake.issue().unwrap();

        assert!(handshake.verify(Some(&nonce)));
        assert!(!handshake.verify(Some(&nonce)));
        assert!(storage.is_empty());
    }

    #[test]
    fn verify_fails_after_window() {
        let (handshake, _, clock) = handshake();
        let nonce = handshake.issue().unwrap();

        clock.advance(DEFAULT_STATE_TTL + Duration::from_millis(1));

        assert!(!handshake.verify(Some(&nonce)));
    }

    #[test]
    fn verify_at_window_edge_succeeds() {
        let (handshake, _, clock) = handshake();
        let nonce = handshake.issue().unwrap();

        clock.advance(DEFAULT_STATE_TTL);

        assert!(handshake.verify(Some(&nonce)));
    }

    #[test]
    fn failed_verification_still_consumes_state() {
        let (handshake, storage, _) = handshake();
        let nonce = handshake.issue().unwrap();

        assert!(!handshake.verify(Some("forged")));
        assert!(storage.is_empty());
        assert!(!handshake.verify(Some(&nonce)));
    }

    #[test]
    fn missing_nonce_consumes_state() {
        let (handshake, _, _) = handshake();
        let nonce = handshake.issue().unwrap();

        assert!(!handshake.verify(None));
        assert!(!handshake.is_pending());
        assert!(!handshake.verify(Some(&nonce)));
    }

    #[test]
    fn reissue_replaces_outstanding_nonce() {
        let (handshake, _, _) = handshake();
        let first = handshake.issue().unwrap();
        let second = handshake.issue().unwrap();

        assert_ne!(first, second);
        assert!(!handshake.verify(Some(&first)));

        let third = handshake.issue().unwrap();
        assert!(handshake.verify(Some(&third)));
    }

    #[test]
    fn unreadable_time_fails_verification() {
        let (handshake, storage, _) = handshake();
        let nonce = handshake.issue().unwrap();
        storage.set(OAUTH_STATE_TIME_KEY, "yesterday").unwrap();

        assert!(!handshake.verify(Some(&nonce)));
    }

    #[test]
    fn custom_ttl_is_honoured() {
        let (handshake, _, clock) = handshake();
        let handshake = handshake.with_ttl(Duration::from_secs(30));
        let nonce = handshake.issue().unwrap();

        clock.advance(Duration::from_secs(31));

        assert!(!handshake.verify(Some(&nonce)));
    }
}
