//! OAuth identity provider configuration
//!
//! Builds the authorization redirect for Google and Facebook and parses the
//! callback URL they send the browser back to
//! (`{origin}/oauth/callback/{provider}?code=..&state=..`).

use std::collections::HashMap;

use authenhub_domain::SocialProvider;
use thiserror::Error;
use url::Url;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const FACEBOOK_AUTH_URL: &str = "https://www.facebook.com/v12.0/dialog/oauth";

/// Provider configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("OAuth provider {0} is not configured")]
    NotConfigured(SocialProvider),

    #[error("Invalid OAuth URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for ProviderError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Settings for one identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: SocialProvider,
    pub client_id: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub scope: String,
    /// Extra query parameters appended after the standard ones.
    pub extra_params: Vec<(String, String)>,
}

impl ProviderConfig {
    /// Google with account picker, redirecting to
    /// `{origin}/oauth/callback/google`.
    pub fn google(client_id: impl Into<String>, origin: &str) -> Self {
        Self {
            provider: SocialProvider::Google,
            client_id: client_id.into(),
            redirect_uri: callback_uri(origin, SocialProvider::Google),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            scope: "openid profile email".to_string(),
            extra_params: vec![("prompt".to_string(), "select_account".to_string())],
        }
    }

    /// Facebook, redirecting to `{origin}/oauth/callback/facebook`.
    pub fn facebook(client_id: impl Into<String>, origin: &str) -> Self {
        Self {
            provider: SocialProvider::Facebook,
            client_id: client_id.into(),
            redirect_uri: callback_uri(origin, SocialProvider::Facebook),
            auth_url: FACEBOOK_AUTH_URL.to_string(),
            scope: "public_profile,email".to_string(),
            extra_params: Vec::new(),
        }
    }

    /// Authorization URL carrying `state`.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidUrl`] if `auth_url` does not parse.
    pub fn authorization_url(&self, state: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.auth_url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("scope", &self.scope)
                .append_pair("state", state);
            for (key, value) in &self.extra_params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

fn callback_uri(origin: &str, provider: SocialProvider) -> String {
    format!("{}/oauth/callback/{}", origin.trim_end_matches('/'), provider.slug())
}

/// Configured providers, keyed by [`SocialProvider`].
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<SocialProvider, ProviderConfig>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a provider.
    #[must_use]
    pub fn with(mut self, config: ProviderConfig) -> Self {
        self.providers.insert(config.provider, config);
        self
    }

    #[must_use]
    pub fn get(&self, provider: SocialProvider) -> Option<&ProviderConfig> {
        self.providers.get(&provider)
    }

    /// # Errors
    /// Returns [`ProviderError::NotConfigured`] for unknown providers.
    pub fn require(&self, provider: SocialProvider) -> Result<&ProviderConfig, ProviderError> {
        self.get(provider).ok_or(ProviderError::NotConfigured(provider))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Query and path data extracted from a provider callback URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub provider: Option<SocialProvider>,
    /// `error` parameter set when the user denied consent.
    pub error: Option<String>,
}

impl CallbackParams {
    /// Extract `code`, `state` and `error` from the query and the provider
    /// from the last path segment.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self {
            provider: url
                .path_segments()
                .and_then(|segments| segments.rev().find(|s| !s.is_empty()))
                .and_then(SocialProvider::parse),
            ..Self::default()
        };

        for (key, value) in url.query_pairs() {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                _ => continue,
            };
            if !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }

        params
    }

    /// Parse a full callback URL string.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidUrl`] if `raw` is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, ProviderError> {
        Ok(Self::from_url(&Url::parse(raw)?))
    }
}
