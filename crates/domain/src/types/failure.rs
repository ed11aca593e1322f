//! Failure shapes: what a backend call can fail with, and what callers see.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Per-field validation messages keyed by form field name.
pub type FieldErrors = BTreeMap<String, String>;

/// The single error shape the session layer and UI consume.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct NormalizedError {
    pub message: String,
    /// HTTP status, or `0` when no response was received.
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl NormalizedError {
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self { message: message.into(), status_code, error_code: None, field_errors: None }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_field_errors(mut self, field_errors: FieldErrors) -> Self {
        self.field_errors = if field_errors.is_empty() { None } else { Some(field_errors) };
        self
    }

    /// Replace the human message, keeping code, status and field errors.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Whether the machine-readable code equals `code`.
    #[must_use]
    pub fn is(&self, code: &str) -> bool {
        self.error_code.as_deref() == Some(code)
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }

    /// No response reached the client.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        self.status_code == 0
    }
}

/// A failed backend call before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFailure {
    /// The server answered with a failure status (or a rejected envelope).
    Response {
        status: u16,
        /// Parsed JSON body; non-JSON text arrives as [`Value::String`].
        body: Option<Value>,
    },
    /// The request was sent but nothing came back (offline, DNS, timeout).
    NoResponse { detail: String },
    /// The request could not be built.
    RequestSetup { detail: Option<String> },
    /// Anything else, e.g. a success body that failed to decode.
    Unexpected { detail: String },
}

impl RawFailure {
    /// Status of the response, `None` for transport-level failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Response { status: 401, .. })
    }
}
