//! Client configuration structures

use serde::{Deserialize, Serialize};

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8118";

/// Default origin the OAuth providers redirect back to.
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_URL.to_string(), timeout_secs: default_timeout_secs() }
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Which durable store backs the token store and OAuth handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Platform keychain (macOS Keychain, Windows Credential Manager, Secret
    /// Service).
    #[default]
    Keychain,
    /// JSON document on disk.
    File,
    /// Process memory only; nothing survives a restart.
    Memory,
}

impl StorageBackend {
    /// Parse a backend name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keychain" => Some(Self::Keychain),
            "file" => Some(Self::File),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Durable storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Keychain service name.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// File path for [`StorageBackend::File`].
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            service_name: default_service_name(),
            path: None,
        }
    }
}

fn default_service_name() -> String {
    "AuthenHub.session".to_string()
}

/// OAuth provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Origin used to build `{origin}/oauth/callback/{provider}` redirects.
    #[serde(default = "default_origin")]
    pub app_origin: String,
    #[serde(default)]
    pub google_client_id: Option<String>,
    #[serde(default)]
    pub facebook_client_id: Option<String>,
    /// Validity window of an issued OAuth nonce.
    #[serde(default = "default_state_ttl_secs")]
    pub state_ttl_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            app_origin: default_origin(),
            google_client_id: None,
            facebook_client_id: None,
            state_ttl_secs: default_state_ttl_secs(),
        }
    }
}

fn default_origin() -> String {
    DEFAULT_APP_ORIGIN.to_string()
}

const fn default_state_ttl_secs() -> u64 {
    600
}

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_filter(), json: false }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"api": {"base_url": "https://api.example.com"}}"#).unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.storage.backend, StorageBackend::Keychain);
        assert_eq!(config.oauth.state_ttl_secs, 600);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn storage_backend_parse_is_case_insensitive() {
        assert_eq!(StorageBackend::parse("FILE"), Some(StorageBackend::File));
        assert_eq!(StorageBackend::parse(" memory "), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse("sqlite"), None);
    }
}
