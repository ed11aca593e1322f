//! Test doubles for the session ports
//!
//! Enabled with the `test-utils` feature.

mod backend;
mod recorders;

pub use backend::{auth_payload, Endpoint, MockAuthBackend};
pub use recorders::{RecordingNavigator, RecordingNotifier};
