//! JSON transport shared by the auth backend and the API client.
//!
//! Success bodies go through [`Envelope::classify`]; an envelope that
//! reports failure with a 2xx status is surfaced as a
//! [`RawFailure::Response`] carrying `{code, message}` so the normalizer
//! treats it like any other handled backend error.

use std::sync::Arc;

use authenhub_domain::{Envelope, EnvelopeRejection, RawFailure};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::IntoRawFailure;
use crate::http::HttpClient;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP client bound to the API base URL.
#[derive(Clone)]
pub struct Transport {
    http: Arc<HttpClient>,
    base_url: String,
}

impl Transport {
    pub fn new(http: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/auth/me`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Send one request and decode the unwrapped payload as `T`.
    ///
    /// # Errors
    /// Any non-2xx status, a rejecting envelope, a transport failure or an
    /// undecodable payload, as the matching [`RawFailure`].
    pub async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<&B>,
    ) -> Result<T, RawFailure>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        let mut request = self
            .http
            .request(method, self.url_for(path))
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.http.send(request).await?;
        debug!(%request_id, path, status = response.status().as_u16(), "API response");
        decode(response).await
    }
}

/// Turn a response into the payload or a [`RawFailure`].
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RawFailure> {
    let status = response.status();
    let text = response.text().await.map_err(IntoRawFailure::into_raw_failure)?;

    if !status.is_success() {
        return Err(RawFailure::Response { status: status.as_u16(), body: failure_body(&text) });
    }

    let body = if is_empty_success(status, &text) {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(|err| {
            warn!(status = status.as_u16(), error = %err, "Response body is not JSON");
            RawFailure::Unexpected { detail: format!("Failed to parse response: {err}") }
        })?
    };

    let payload = Envelope::classify(body)
        .into_payload()
        .map_err(|rejection| rejected(status, rejection))?;

    serde_json::from_value(payload).map_err(|err| RawFailure::Unexpected {
        detail: format!("Unexpected response payload: {err}"),
    })
}

fn is_empty_success(status: StatusCode, text: &str) -> bool {
    status == StatusCode::NO_CONTENT
        || status == StatusCode::RESET_CONTENT
        || text.trim().is_empty()
}

fn failure_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

fn rejected(status: StatusCode, rejection: EnvelopeRejection) -> RawFailure {
    let mut body = Map::new();
    if let Some(code) = rejection.code {
        body.insert("code".into(), Value::String(code));
    }
    if let Some(message) = rejection.message {
        body.insert("message".into(), Value::String(message));
    }
    debug!(status = status.as_u16(), ?body, "Envelope rejected");
    RawFailure::Response { status: status.as_u16(), body: Some(Value::Object(body)) }
}

#[cfg(test)]
mod tests {
    use serde::de::IgnoredAny;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn transport(server: &MockServer) -> Transport {
        Transport::new(Arc::new(HttpClient::new().expect("http client")), server.uri())
    }

    #[tokio::test]
    async fn unwraps_coded_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things"))
            .and(header("authorization", "Bearer abc"))
            .and(header_exists("x-request-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "00", "message": "ok", "data": {"id": 7}
            })))
            .mount(&server)
            .await;

        let value: Value = transport(&server)
            .await
            .execute::<(), _>(Method::GET, "/things", Some("abc"), None)
            .await
            .unwrap();

        assert_eq!(value, json!({"id": 7}));
    }

    #[tokio::test]
    async fn coded_rejection_becomes_response_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "EMAIL_EXISTS", "message": "Email already in use"
            })))
            .mount(&server)
            .await;

        let failure = transport(&server)
            .await
            .execute::<_, Value>(Method::POST, "/auth/register", None, Some(&json!({})))
            .await
            .unwrap_err();

        assert_eq!(
            failure,
            RawFailure::Response {
                status: 200,
                body: Some(json!({"code": "EMAIL_EXISTS", "message": "Email already in use"})),
            }
        );
    }

    #[tokio::test]
    async fn flagged_failure_keeps_only_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false, "message": "Refresh token expired"
            })))
            .mount(&server)
            .await;

        let failure = transport(&server)
            .await
            .execute::<(), Value>(Method::POST, "/auth/refresh-token", Some("r"), None)
            .await
            .unwrap_err();

        assert_eq!(
            failure,
            RawFailure::Response {
                status: 200,
                body: Some(json!({"message": "Refresh token expired"})),
            }
        );
    }

    #[tokio::test]
    async fn error_status_keeps_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
            .mount(&server)
            .await;

        let failure = transport(&server)
            .await
            .execute::<(), Value>(Method::GET, "/auth/me", None, None)
            .await
            .unwrap_err();

        assert_eq!(
            failure,
            RawFailure::Response { status: 502, body: Some(Value::String("Bad gateway".into())) }
        );
    }

    #[tokio::test]
    async fn empty_success_decodes_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let result = transport(&server)
            .await
            .execute::<_, IgnoredAny>(Method::POST, "/auth/forgot-password", None, Some(&json!({})))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unparseable_success_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let failure = transport(&server)
            .await
            .execute::<(), Value>(Method::GET, "/", None, None)
            .await
            .unwrap_err();

        assert!(matches!(failure, RawFailure::Unexpected { .. }));
    }

    #[test]
    fn url_for_joins_paths() {
        let http = Arc::new(HttpClient::new().expect("http client"));
        let transport = Transport::new(http, "http://localhost:8080/api/");

        assert_eq!(transport.url_for("/auth/me"), "http://localhost:8080/api/auth/me");
        assert_eq!(transport.url_for("users"), "http://localhost:8080/api/users");
    }
}
