//! Configuration loader
//!
//! Loads [`ClientConfig`] from a config file and the environment.
//!
//! ## Loading Strategy
//! 1. Reads `.env` from the working directory if one exists
//! 2. Probes the standard locations for a config file (JSON or TOML); without
//!    one the built-in defaults are used
//! 3. Applies environment overrides on top, so a variable always wins over
//!    the file
//!
//! ## Environment Variables
//! - `AUTHENHUB_API_URL`: Backend base URL
//! - `AUTHENHUB_API_TIMEOUT`: Request timeout in seconds
//! - `AUTHENHUB_STORAGE`: `keychain`, `file` or `memory`
//! - `AUTHENHUB_STORAGE_PATH`: Session file for the `file` backend
//! - `AUTHENHUB_GOOGLE_CLIENT_ID`: Google OAuth client id
//! - `AUTHENHUB_FACEBOOK_CLIENT_ID`: Facebook OAuth client id
//! - `AUTHENHUB_APP_ORIGIN`: Origin the providers redirect back to
//! - `AUTHENHUB_LOG`: Log filter directive (`RUST_LOG` still takes precedence)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./authenhub.{toml,json}` then `./config.{toml,json}`
//! 2. The same names in the parent directory
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use authenhub_domain::{AuthenHubError, ClientConfig, Result, StorageBackend};

pub const ENV_API_URL: &str = "AUTHENHUB_API_URL";
pub const ENV_API_TIMEOUT: &str = "AUTHENHUB_API_TIMEOUT";
pub const ENV_STORAGE: &str = "AUTHENHUB_STORAGE";
pub const ENV_STORAGE_PATH: &str = "AUTHENHUB_STORAGE_PATH";
pub const ENV_GOOGLE_CLIENT_ID: &str = "AUTHENHUB_GOOGLE_CLIENT_ID";
pub const ENV_FACEBOOK_CLIENT_ID: &str = "AUTHENHUB_FACEBOOK_CLIENT_ID";
pub const ENV_APP_ORIGIN: &str = "AUTHENHUB_APP_ORIGIN";
pub const ENV_LOG: &str = "AUTHENHUB_LOG";

const FILE_NAMES: [&str; 4] = ["authenhub.toml", "authenhub.json", "config.toml", "config.json"];

/// Load configuration: `.env`, then the first probed file, then environment
/// overrides.
///
/// # Errors
/// Returns `AuthenHubError::Config` if the probed file cannot be read or
/// parsed, or an override has an invalid value.
pub fn load() -> Result<ClientConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "Ignoring unreadable .env file"),
    }

    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            ClientConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    tracing::info!(
        base_url = %config.api.base_url,
        storage = ?config.storage.backend,
        "Configuration loaded"
    );
    Ok(config)
}

/// Defaults plus environment overrides, without touching the filesystem.
///
/// # Errors
/// Returns `AuthenHubError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Missing sections and
/// fields take their defaults.
///
/// # Errors
/// Returns `AuthenHubError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AuthenHubError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AuthenHubError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AuthenHubError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Overwrite `config` fields with any `AUTHENHUB_*` variables that are set.
///
/// # Errors
/// Returns `AuthenHubError::Config` for an unparsable timeout or an unknown
/// storage backend.
pub fn apply_env_overrides(config: &mut ClientConfig) -> Result<()> {
    if let Some(url) = env_opt(ENV_API_URL) {
        config.api.base_url = url;
    }
    if let Some(raw) = env_opt(ENV_API_TIMEOUT) {
        config.api.timeout_secs = raw
            .parse::<u64>()
            .map_err(|e| AuthenHubError::Config(format!("Invalid API timeout: {e}")))?;
    }
    if let Some(raw) = env_opt(ENV_STORAGE) {
        config.storage.backend = StorageBackend::parse(&raw).ok_or_else(|| {
            AuthenHubError::Config(format!("Unknown storage backend: {raw}"))
        })?;
    }
    if let Some(path) = env_opt(ENV_STORAGE_PATH) {
        config.storage.path = Some(path);
    }
    if let Some(id) = env_opt(ENV_GOOGLE_CLIENT_ID) {
        config.oauth.google_client_id = Some(id);
    }
    if let Some(id) = env_opt(ENV_FACEBOOK_CLIENT_ID) {
        config.oauth.facebook_client_id = Some(id);
    }
    if let Some(origin) = env_opt(ENV_APP_ORIGIN) {
        config.oauth.app_origin = origin;
    }
    if let Some(filter) = env_opt(ENV_LOG) {
        config.logging.filter = filter;
    }
    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `AuthenHubError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AuthenHubError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AuthenHubError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AuthenHubError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join(".."));
        dirs.insert(0, cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Non-empty environment variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::Builder;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 8] = [
        ENV_API_URL,
        ENV_API_TIMEOUT,
        ENV_STORAGE,
        ENV_STORAGE_PATH,
        ENV_GOOGLE_CLIENT_ID,
        ENV_FACEBOOK_CLIENT_ID,
        ENV_APP_ORIGIN,
        ENV_LOG,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_env_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let config = load_from_env().unwrap();

        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api.base_url, "http://localhost:8118");
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_API_URL, "https://api.example.com");
        std::env::set_var(ENV_API_TIMEOUT, "5");
        std::env::set_var(ENV_STORAGE, "File");
        std::env::set_var(ENV_STORAGE_PATH, "/tmp/session.json");
        std::env::set_var(ENV_GOOGLE_CLIENT_ID, "google-id");
        std::env::set_var(ENV_FACEBOOK_CLIENT_ID, "fb-id");
        std::env::set_var(ENV_APP_ORIGIN, "https://portal.example.com");
        std::env::set_var(ENV_LOG, "authenhub=debug");

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.path.as_deref(), Some("/tmp/session.json"));
        assert_eq!(config.oauth.google_client_id.as_deref(), Some("google-id"));
        assert_eq!(config.oauth.facebook_client_id.as_deref(), Some("fb-id"));
        assert_eq!(config.oauth.app_origin, "https://portal.example.com");
        assert_eq!(config.logging.filter, "authenhub=debug");
    }

    #[test]
    fn test_load_from_env_invalid_timeout() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var(ENV_API_TIMEOUT, "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(AuthenHubError::Config(_))));
    }

    #[test]
    fn test_load_from_env_unknown_backend() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var(ENV_STORAGE, "sqlite");

        let err = load_from_env().unwrap_err();
        clear_env();

        assert_eq!(err, AuthenHubError::Config("Unknown storage backend: sqlite".into()));
    }

    #[test]
    fn test_blank_variables_are_ignored() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var(ENV_API_URL, "   ");

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.api.base_url, "http://localhost:8118");
    }

    #[test]
    fn test_load_from_file_toml() {
        let file = temp_config(
            ".toml",
            r#"
            [api]
            base_url = "https://toml.example.com"
            timeout_secs = 12

            [storage]
            backend = "memory"

            [oauth]
            google_client_id = "gid"
            "#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.api.base_url, "https://toml.example.com");
        assert_eq!(config.api.timeout_secs, 12);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.oauth.google_client_id.as_deref(), Some("gid"));
        assert_eq!(config.oauth.state_ttl_secs, 600);
    }

    #[test]
    fn test_load_from_file_json() {
        let file = temp_config(
            ".json",
            r#"{"api": {"base_url": "https://json.example.com"}, "logging": {"json": true}}"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.api.base_url, "https://json.example.com");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_file_invalid_format() {
        let file = temp_config(".json", "{ not json");

        let result = load_from_file(Some(file.path().to_path_buf()));

        assert!(matches!(result, Err(AuthenHubError::Config(msg)) if msg.contains("JSON")));
    }

    #[test]
    fn test_load_from_file_unsupported_extension() {
        let file = temp_config(".yaml", "api: {}");

        let result = load_from_file(Some(file.path().to_path_buf()));

        assert!(matches!(result, Err(AuthenHubError::Config(msg)) if msg.contains("yaml")));
    }

    #[test]
    fn test_load_from_file_missing_path() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/authenhub.toml")));

        assert!(matches!(result, Err(AuthenHubError::Config(msg)) if msg.contains("not found")));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        let file = temp_config(".toml", "[api]\nbase_url = \"https://file.example.com\"\n");
        std::env::set_var(ENV_API_URL, "https://env.example.com");

        let mut config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        apply_env_overrides(&mut config).unwrap();
        clear_env();

        assert_eq!(config.api.base_url, "https://env.example.com");
    }
}
