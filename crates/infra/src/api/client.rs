//! Authenticated API client
//!
//! Attaches the current bearer to every request. A 401 triggers exactly one
//! refresh through the [`AccessTokenProvider`] and one retry; concurrent
//! 401s share a single refresh because the provider serializes them. A
//! request is never retried under a different sign-in than the one it was
//! sent for. Every failure reaches the caller as a [`NormalizedError`].

use std::sync::Arc;

use authenhub_core::normalize;
use authenhub_domain::{NormalizedError, RawFailure};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::auth::AccessTokenProvider;
use super::transport::Transport;

/// API client with refresh-on-401.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<Transport>,
    auth: Arc<dyn AccessTokenProvider>,
}

impl ApiClient {
    pub fn new(transport: Arc<Transport>, auth: Arc<dyn AccessTokenProvider>) -> Self {
        Self { transport, auth }
    }

    /// Execute a GET request
    ///
    /// # Errors
    /// Returns the normalized failure after at most one refresh and retry.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, NormalizedError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    /// Execute a POST request
    ///
    /// # Errors
    /// Returns the normalized failure after at most one refresh and retry.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, NormalizedError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    /// # Errors
    /// Returns the normalized failure after at most one refresh and retry.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, NormalizedError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// # Errors
    /// Returns the normalized failure after at most one refresh and retry.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, NormalizedError> {
        self.send::<(), T>(Method::DELETE, path, None).await
    }

    /// Send any request through the refresh-and-retry pipeline.
    ///
    /// Use [`serde::de::IgnoredAny`] as `T` when the payload is irrelevant.
    ///
    /// # Errors
    /// The normalized failure of the last attempt. When the refresh itself
    /// fails, the original 401 is reported and the session has been ended.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, NormalizedError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let generation = self.auth.generation();
        let token = self.auth.access_token().await;
        let failure =
            match self.transport.execute(method.clone(), path, token.as_deref(), body).await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

        if !failure.is_unauthorized() {
            return Err(reject(path, &failure));
        }

        debug!(path, "Request unauthorized, attempting token refresh");
        if !self.auth.refresh_after_rejection(token.as_deref(), generation).await {
            warn!(path, "Token refresh failed, giving up on request");
            return Err(reject(path, &failure));
        }

        let token = self.auth.access_token().await;
        let result = self
            .transport
            .execute(method, path, token.as_deref(), body)
            .await
            .map_err(|failure| reject(path, &failure))?;

        info!(path, "Request succeeded after token refresh");
        Ok(result)
    }
}

fn reject(path: &str, failure: &RawFailure) -> NormalizedError {
    let error = normalize(failure);
    debug!(
        path,
        status = error.status_code,
        code = error.error_code.as_deref().unwrap_or(""),
        "API request failed"
    );
    error
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::HttpClient;

    /// Token holder whose refresh swaps in `next` once.
    struct StaticTokens {
        current: Mutex<Option<String>>,
        next: Option<String>,
        refreshes: AtomicUsize,
        generation: AtomicU64,
        generations_seen: Mutex<Vec<u64>>,
    }

    impl StaticTokens {
        fn new(current: Option<&str>, next: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                current: Mutex::new(current.map(str::to_string)),
                next: next.map(str::to_string),
                refreshes: AtomicUsize::new(0),
                generation: AtomicU64::new(0),
                generations_seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AccessTokenProvider for StaticTokens {
        async fn access_token(&self) -> Option<String> {
            self.current.lock().clone()
        }

        fn generation(&self) -> u64 {
            self.generation.load(Ordering::SeqCst)
        }

        async fn refresh_after_rejection(&self, _rejected: Option<&str>, generation: u64) -> bool {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            self.generations_seen.lock().push(generation);
            match &self.next {
                Some(next) => {
                    *self.current.lock() = Some(next.clone());
                    true
                }
                None => false,
            }
        }
    }

    fn client(server: &MockServer, tokens: Arc<StaticTokens>) -> ApiClient {
        let http = Arc::new(HttpClient::new().expect("http client"));
        ApiClient::new(Arc::new(Transport::new(http, server.uri())), tokens)
    }

    #[tokio::test]
    async fn retries_once_with_refreshed_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports"))
            .and(header("authorization", "Bearer old"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/reports"))
            .and(header("authorization", "Bearer new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = StaticTokens::new(Some("old"), Some("new"));
        tokens.generation.store(4, Ordering::SeqCst);
        let value: Value = client(&server, tokens.clone()).get("/reports").await.unwrap();

        assert_eq!(value, json!([1, 2]));
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(*tokens.generations_seen.lock(), vec![4]);
    }

    #[tokio::test]
    async fn second_unauthorized_is_not_refreshed_again() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": "UNAUTHORIZED", "message": "nope"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let tokens = StaticTokens::new(Some("old"), Some("new"));
        let error = client(&server, tokens.clone()).delete::<Value>("/users/4").await.unwrap_err();

        assert!(error.is_unauthorized());
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refresh_reports_original_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "errorCode": "INVALID_TOKEN", "message": "Token expired"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = StaticTokens::new(Some("old"), None);
        let error = client(&server, tokens)
            .post::<_, Value>("/reports", &json!({"name": "q3"}))
            .await
            .unwrap_err();

        assert_eq!(error.message, "Token expired");
        assert_eq!(error.status_code, 401);
        assert_eq!(error.error_code.as_deref(), Some("INVALID_TOKEN"));
    }

    #[tokio::test]
    async fn other_failures_skip_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "FORBIDDEN", "message": "Forbidden"
            })))
            .mount(&server)
            .await;

        let tokens = StaticTokens::new(Some("old"), Some("new"));
        let error = client(&server, tokens.clone())
            .put::<_, Value>("/settings", &json!({}))
            .await
            .unwrap_err();

        assert_eq!(error.status_code, 403);
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn anonymous_requests_carry_no_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(move |req: &wiremock::Request| {
                if req.headers.contains_key("authorization") {
                    ResponseTemplate::new(400)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!({"open": true}))
                }
            })
            .mount(&server)
            .await;

        let value: Value =
            client(&server, StaticTokens::new(None, None)).get("/public").await.unwrap();

        assert_eq!(value, json!({"open": true}));
    }
}
