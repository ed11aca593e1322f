//! Error types used throughout the SDK

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for AuthenHub infrastructure concerns
///
/// Session-level failures are reported as [`crate::NormalizedError`]; this
/// enum covers wiring problems (configuration, storage backends, client
/// construction) that happen outside a backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AuthenHubError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for AuthenHub operations
pub type Result<T> = std::result::Result<T, AuthenHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = AuthenHubError::Config("missing base url".into());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "Config");
        assert_eq!(json["message"], "missing base url");
        assert_eq!(err.to_string(), "Configuration error: missing base url");
    }
}
