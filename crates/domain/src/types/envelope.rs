//! Success-body envelope classification.
//!
//! The backend answers in one of three shapes:
//!
//! - `{code, message, data}`: `code == "00"` is success, anything else is a
//!   handled failure reported with HTTP 200
//! - `{success, message, data}`: used by the token refresh endpoint
//! - the bare payload
//!
//! [`Envelope::classify`] picks the shape once, in that priority order.

use serde_json::{Map, Value};

use crate::constants::SUCCESS_CODE;

/// A success-status body, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Coded { code: String, message: Option<String>, data: Option<Value> },
    Flagged { success: bool, message: Option<String>, data: Option<Value> },
    Raw(Value),
}

/// A body whose envelope reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeRejection {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl Envelope {
    /// Classify a decoded body.
    #[must_use]
    pub fn classify(body: Value) -> Self {
        let Value::Object(mut map) = body else {
            return Self::Raw(body);
        };

        if let Some(code) = coded_marker(&map) {
            return Self::Coded {
                code,
                message: take_message(&mut map),
                data: map.remove("data"),
            };
        }

        if let Some(success) = map.get("success").and_then(Value::as_bool) {
            if map.contains_key("data") || map.contains_key("message") {
                return Self::Flagged {
                    success,
                    message: take_message(&mut map),
                    data: map.remove("data"),
                };
            }
        }

        Self::Raw(Value::Object(map))
    }

    /// Unwrap the payload, or report the rejection.
    ///
    /// An accepted envelope without `data` yields [`Value::Null`].
    ///
    /// # Errors
    /// Returns [`EnvelopeRejection`] when the envelope signals failure.
    pub fn into_payload(self) -> Result<Value, EnvelopeRejection> {
        match self {
            Self::Coded { code, message, data } => {
                if code == SUCCESS_CODE {
                    Ok(data.unwrap_or(Value::Null))
                } else {
                    Err(EnvelopeRejection { code: Some(code), message })
                }
            }
            Self::Flagged { success: true, data, .. } => Ok(data.unwrap_or(Value::Null)),
            Self::Flagged { success: false, message, .. } => {
                Err(EnvelopeRejection { code: None, message })
            }
            Self::Raw(value) => Ok(value),
        }
    }
}

/// `{code: "<string>", message|data}` marks the coded envelope. A profile or
/// token payload never carries a string `code` next to `message`/`data`.
fn coded_marker(map: &Map<String, Value>) -> Option<String> {
    let code = map.get("code")?.as_str()?;
    (map.contains_key("data") || map.contains_key("message")).then(|| code.to_string())
}

fn take_message(map: &mut Map<String, Value>) -> Option<String> {
    match map.remove("message") {
        Some(Value::String(message)) => Some(message),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn coded_success_yields_data() {
        let envelope = Envelope::classify(json!({
            "code": "00", "message": "Success", "data": {"id": "1"}
        }));

        assert_eq!(envelope.into_payload().unwrap(), json!({"id": "1"}));
    }

    #[test]
    fn coded_failure_is_rejected_even_on_success_status() {
        let envelope = Envelope::classify(json!({"code": "99", "message": "Exception"}));

        let rejection = envelope.into_payload().unwrap_err();
        assert_eq!(rejection.code.as_deref(), Some("99"));
        assert_eq!(rejection.message.as_deref(), Some("Exception"));
    }

    #[test]
    fn flagged_envelope_from_refresh_endpoint() {
        let ok = Envelope::classify(json!({
            "success": true, "message": "ok", "data": {"token": "t", "username": "alice"}
        }));
        let failed = Envelope::classify(json!({"success": false, "message": "expired"}));

        assert_eq!(ok.into_payload().unwrap()["token"], "t");
        assert_eq!(failed.into_payload().unwrap_err().message.as_deref(), Some("expired"));
    }

    #[test]
    fn bare_payload_passes_through() {
        let body = json!({"token": "t", "user": {"id": "1", "username": "alice"}});

        assert_eq!(Envelope::classify(body.clone()), Envelope::Raw(body.clone()));
        assert_eq!(Envelope::classify(body.clone()).into_payload().unwrap(), body);
        assert_eq!(Envelope::classify(json!([1, 2])).into_payload().unwrap(), json!([1, 2]));
    }

    #[test]
    fn accepted_envelope_without_data_is_null() {
        let envelope = Envelope::classify(json!({"code": "00", "message": "done"}));
        assert_eq!(envelope.into_payload().unwrap(), Value::Null);
    }
}
