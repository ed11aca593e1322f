//! Raw failure → [`NormalizedError`]
//!
//! The backend has shipped two error body formats over time, so the body is
//! read as an explicit union, tried in this order:
//!
//! 1. **Structured**: `{code, message, fieldErrors?}`. A few well-known
//!    statuses get a friendlier message than the backend's.
//! 2. **Legacy**: `{message, errorCode?, status?, fieldErrors?|errors?}`. The
//!    message is shown as sent.
//! 3. **Unrecognised**: anything else, including non-JSON text.
//!
//! A body carrying `errorCode` is always legacy, even next to a `code`.
//!
//! [`normalize`] is total: it never fails and never panics.

use authenhub_domain::constants::{codes, messages};
use authenhub_domain::{FieldErrors, NormalizedError, RawFailure};
use serde_json::{Map, Value};

/// Which error body format a response carried.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyFormat<'a> {
    Structured(&'a Map<String, Value>),
    Legacy(&'a Map<String, Value>),
    Unrecognised,
}

impl<'a> BodyFormat<'a> {
    /// Classify an optional response body.
    #[must_use]
    pub fn of(body: Option<&'a Value>) -> Self {
        let Some(Value::Object(map)) = body else {
            return Self::Unrecognised;
        };

        if map.contains_key("errorCode") {
            return Self::Legacy(map);
        }
        if map.get("code").is_some_and(Value::is_string) {
            return Self::Structured(map);
        }
        if map.get("message").is_some_and(Value::is_string) {
            return Self::Legacy(map);
        }
        Self::Unrecognised
    }
}

/// Normalize any failed call.
#[must_use]
pub fn normalize(failure: &RawFailure) -> NormalizedError {
    match failure {
        RawFailure::Response { status, body } => from_response(*status, body.as_ref()),
        RawFailure::NoResponse { .. } => {
            NormalizedError::new(messages::NO_RESPONSE, 0).with_code(codes::NETWORK_ERROR)
        }
        RawFailure::RequestSetup { detail } => NormalizedError::new(
            detail.as_deref().filter(|d| !d.is_empty()).unwrap_or(messages::REQUEST_SETUP),
            0,
        ),
        RawFailure::Unexpected { detail } => NormalizedError::new(
            if detail.is_empty() { messages::GENERIC } else { detail.as_str() },
            0,
        )
        .with_code(codes::UNKNOWN_ERROR),
    }
}

fn from_response(status: u16, body: Option<&Value>) -> NormalizedError {
    match BodyFormat::of(body) {
        BodyFormat::Structured(map) => {
            let code = string_field(map, "code");
            let message = friendly_message(status, code.as_deref())
                .map(str::to_string)
                .or_else(|| string_field(map, "message"))
                .unwrap_or_else(|| messages::GENERIC.to_string());

            finish(NormalizedError::new(message, status), code, map)
        }
        BodyFormat::Legacy(map) => {
            let status = map
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok())
                .filter(|s| *s > 0)
                .unwrap_or(status);
            let message =
                string_field(map, "message").unwrap_or_else(|| messages::GENERIC.to_string());

            finish(NormalizedError::new(message, status), string_field(map, "errorCode"), map)
        }
        BodyFormat::Unrecognised => NormalizedError::new(messages::PROCESSING, status),
    }
}

fn finish(
    error: NormalizedError,
    code: Option<String>,
    map: &Map<String, Value>,
) -> NormalizedError {
    let error = match code {
        Some(code) => error.with_code(code),
        None => error,
    };
    error.with_field_errors(field_errors(map))
}

fn friendly_message(status: u16, code: Option<&str>) -> Option<&'static str> {
    match status {
        401 => Some(messages::SESSION_EXPIRED),
        403 => Some(messages::FORBIDDEN),
        404 => Some(messages::NOT_FOUND),
        500 => Some(messages::SERVER_ERROR),
        400 if code == Some(codes::DATABASE_ERROR) => Some(messages::DATABASE_PROBLEM),
        400 if code == Some(codes::NULL_POINTER_ERROR) => Some(messages::PROCESSING_PROBLEM),
        _ => None,
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string)
}

/// `fieldErrors` takes precedence over `errors`. Array values are joined.
fn field_errors(map: &Map<String, Value>) -> FieldErrors {
    let Some(Value::Object(fields)) = map.get("fieldErrors").or_else(|| map.get("errors")) else {
        return FieldErrors::new();
    };

    fields
        .iter()
        .filter_map(|(field, value)| {
            let message = match value {
                Value::String(message) => message.clone(),
                Value::Array(items) => {
                    items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", ")
                }
                _ => return None,
            };
            (!message.is_empty()).then(|| (field.clone(), message))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(status: u16, body: Value) -> RawFailure {
        RawFailure::Response { status, body: Some(body) }
    }

    #[test]
    fn legacy_message_and_code_surface_verbatim() {
        let err = normalize(&response(
            401,
            json!({"message": "Invalid credentials", "errorCode": "INVALID_CREDENTIALS"}),
        ));

        assert_eq!(err.message, "Invalid credentials");
        assert_eq!(err.status_code, 401);
        assert!(err.is(codes::INVALID_CREDENTIALS));
        assert!(err.field_errors.is_none());
    }

    #[test]
    fn legacy_body_status_wins_over_http_status() {
        let err = normalize(&response(
            200,
            json!({"message": "Username exists", "errorCode": "USERNAME_EXISTS", "status": 409}),
        ));

        assert_eq!(err.status_code, 409);
        assert!(err.is(codes::USERNAME_EXISTS));
    }

    #[test]
    fn legacy_validation_errors_are_collected() {
        let err = normalize(&response(
            400,
            json!({
                "message": "Validation failed",
                "errorCode": "VALIDATION_ERROR",
                "errors": {"email": "must be a valid email", "password": ["too short", "no digit"]}
            }),
        ));

        let fields = err.field_errors.unwrap();
        assert_eq!(fields["email"], "must be a valid email");
        assert_eq!(fields["password"], "too short, no digit");
    }

    #[test]
    fn structured_format_uses_friendly_messages() {
        let cases = [
            (401, "INVALID_TOKEN", messages::SESSION_EXPIRED),
            (403, "ACCESS_DENIED", messages::FORBIDDEN),
            (404, "RESOURCE_NOT_FOUND", messages::NOT_FOUND),
            (500, "INTERNAL", messages::SERVER_ERROR),
            (400, "DATABASE_ERROR", messages::DATABASE_PROBLEM),
            (400, "NULL_POINTER_ERROR", messages::PROCESSING_PROBLEM),
        ];

        for (status, code, expected) in cases {
            let err = normalize(&response(status, json!({"code": code, "message": "raw"})));
            assert_eq!(err.message, expected, "status {status} code {code}");
            assert_eq!(err.status_code, status);
            assert!(err.is(code));
        }
    }

    #[test]
    fn structured_format_keeps_other_messages() {
        let err = normalize(&response(
            400,
            json!({
                "code": "VALIDATION_ERROR",
                "message": "Please fix the highlighted fields",
                "fieldErrors": {"username": "required"}
            }),
        ));

        assert_eq!(err.message, "Please fix the highlighted fields");
        assert_eq!(err.field_errors.unwrap()["username"], "required");
    }

    #[test]
    fn unrecognised_bodies_keep_status() {
        for body in [None, Some(json!("<html>Bad Gateway</html>")), Some(json!({"foo": 1}))] {
            let err = normalize(&RawFailure::Response { status: 502, body });
            assert_eq!(err.message, messages::PROCESSING);
            assert_eq!(err.status_code, 502);
            assert!(err.error_code.is_none());
        }
    }

    #[test]
    fn no_response_is_status_zero() {
        let err = normalize(&RawFailure::NoResponse { detail: "connection refused".into() });

        assert_eq!(err.message, messages::NO_RESPONSE);
        assert!(err.is_transport());
        assert!(err.is(codes::NETWORK_ERROR));
    }

    #[test]
    fn setup_and_unexpected_failures() {
        let setup = normalize(&RawFailure::RequestSetup { detail: None });
        assert_eq!(setup.message, messages::REQUEST_SETUP);
        assert_eq!(setup.status_code, 0);

        let detailed = normalize(&RawFailure::RequestSetup { detail: Some("bad header".into()) });
        assert_eq!(detailed.message, "bad header");

        let unexpected = normalize(&RawFailure::Unexpected { detail: String::new() });
        assert_eq!(unexpected.message, messages::GENERIC);
        assert!(unexpected.is(codes::UNKNOWN_ERROR));
    }

    #[test]
    fn body_format_priority() {
        let both = json!({"code": "X", "errorCode": "Y", "message": "m"});
        assert!(matches!(BodyFormat::of(Some(&both)), BodyFormat::Legacy(_)));

        let coded = json!({"code": "X"});
        assert!(matches!(BodyFormat::of(Some(&coded)), BodyFormat::Structured(_)));

        let numeric_code = json!({"code": 7});
        assert_eq!(BodyFormat::of(Some(&numeric_code)), BodyFormat::Unrecognised);
    }
}
