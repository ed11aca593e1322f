//! Composition root
//!
//! Turns a [`ClientConfig`] into a ready [`ClientContext`]: durable store,
//! token store, OAuth handshake, provider registry, REST backend, session
//! controller, API client and route guard, all sharing one store.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use authenhub_common::auth::{ProviderConfig, ProviderRegistry};
use authenhub_common::storage::{FileStore, KeychainStore};
use authenhub_common::{KeyValueStore, MemoryStore, OAuthStateHandshake, TokenStore};
use authenhub_core::{AuthBackend, Navigator, Notifier, RouteGuard, SessionController};
use authenhub_domain::{ClientConfig, OAuthConfig, Result, StorageBackend, StorageConfig};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, RestAuthBackend, Transport};
use crate::http::HttpClient;

const DEFAULT_SESSION_FILE: &str = "authenhub-session.json";

/// Open the store selected by `config`.
///
/// The file backend defaults to `authenhub-session.json` in the working
/// directory when no path is configured. A keychain that cannot persist
/// values on this platform is replaced by that file store.
#[must_use]
pub fn open_store(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => file_store(config),
        StorageBackend::Keychain => {
            let keychain = KeychainStore::new(config.service_name.as_str());
            if keychain.is_persistent() {
                debug!(service = %config.service_name, "Using keychain session store");
                Arc::new(keychain)
            } else {
                warn!(
                    service = %config.service_name,
                    "Keychain cannot persist sessions; falling back to file storage"
                );
                file_store(config)
            }
        }
    }
}

fn file_store(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    let path =
        config.path.as_deref().map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);
    debug!(path = %path.display(), "Using file session store");
    Arc::new(FileStore::new(path))
}

/// Providers with a configured client id.
#[must_use]
pub fn provider_registry(config: &OAuthConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    if let Some(id) = &config.google_client_id {
        registry = registry.with(ProviderConfig::google(id.as_str(), &config.app_origin));
    }
    if let Some(id) = &config.facebook_client_id {
        registry = registry.with(ProviderConfig::facebook(id.as_str(), &config.app_origin));
    }
    registry
}

/// Everything a client application needs, wired together.
#[derive(Clone)]
pub struct ClientContext {
    pub config: ClientConfig,
    pub storage: Arc<dyn KeyValueStore>,
    pub transport: Arc<Transport>,
    pub controller: Arc<SessionController>,
    pub api: ApiClient,
    pub guard: Arc<RouteGuard>,
}

impl ClientContext {
    pub fn builder(config: ClientConfig) -> ClientContextBuilder {
        ClientContextBuilder {
            config,
            storage: None,
            backend: None,
            notifier: None,
            navigator: None,
        }
    }
}

/// Builder for [`ClientContext`].
pub struct ClientContextBuilder {
    config: ClientConfig,
    storage: Option<Arc<dyn KeyValueStore>>,
    backend: Option<Arc<dyn AuthBackend>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ClientContextBuilder {
    /// Use `storage` instead of opening the configured backend.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Replace the REST backend, e.g. with a test double.
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn AuthBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// # Errors
    /// Returns `AuthenHubError::Config` if the HTTP client cannot be built.
    pub fn build(self) -> Result<ClientContext> {
        let config = self.config;
        let storage = match self.storage {
            Some(storage) => storage,
            None => open_store(&config.storage),
        };

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .max_attempts(2)
            .user_agent(concat!("authenhub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let transport = Arc::new(Transport::new(Arc::new(http), config.api.base_url.as_str()));

        let tokens = Arc::new(TokenStore::new(storage.clone()));
        let handshake = Arc::new(
            OAuthStateHandshake::new(storage.clone())
                .with_ttl(Duration::from_secs(config.oauth.state_ttl_secs)),
        );
        let backend: Arc<dyn AuthBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(RestAuthBackend::new(transport.clone())),
        };

        let mut controller = SessionController::builder(backend, tokens)
            .handshake(handshake)
            .providers(provider_registry(&config.oauth));
        if let Some(notifier) = self.notifier {
            controller = controller.notifier(notifier);
        }
        if let Some(navigator) = self.navigator {
            controller = controller.navigator(navigator);
        }
        let controller = controller.build();

        let api = ApiClient::new(transport.clone(), controller.clone());
        let guard = Arc::new(RouteGuard::new(controller.clone()));

        info!(
            base_url = %config.api.base_url,
            storage = ?config.storage.backend,
            "AuthenHub client ready"
        );
        Ok(ClientContext { config, storage, transport, controller, api, guard })
    }
}
