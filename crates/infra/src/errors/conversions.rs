//! `reqwest::Error` → [`RawFailure`]

use authenhub_domain::RawFailure;
use reqwest::Error as HttpError;

/// Classify a transport error the way the normalizer expects it.
pub(crate) trait IntoRawFailure {
    fn into_raw_failure(self) -> RawFailure;
}

impl IntoRawFailure for HttpError {
    fn into_raw_failure(self) -> RawFailure {
        if self.is_builder() {
            return RawFailure::RequestSetup { detail: Some(self.to_string()) };
        }
        if self.is_decode() {
            return RawFailure::Unexpected { detail: self.to_string() };
        }
        if self.is_timeout() || self.is_request() || self.is_body() || is_connect(&self) {
            return RawFailure::NoResponse { detail: self.to_string() };
        }
        if let Some(status) = self.status() {
            return RawFailure::Response { status: status.as_u16(), body: None };
        }
        RawFailure::Unexpected { detail: self.to_string() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn is_connect(err: &HttpError) -> bool {
    err.is_connect()
}

#[cfg(target_arch = "wasm32")]
fn is_connect(_err: &HttpError) -> bool {
    false
}
