//! # AuthenHub Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The reqwest-based HTTP client and JSON transport
//! - The REST [`AuthBackend`](authenhub_core::AuthBackend)
//! - The authenticated API client with refresh-on-401
//! - Configuration loading and tracing setup
//! - The composition root that wires a client from configuration
//!
//! ## Architecture
//! - Implements traits defined in `authenhub-core`
//! - Depends on `authenhub-common` for storage and `authenhub-domain` for
//!   the data model
//! - Contains all "impure" code (network, filesystem, keychain)

pub mod api;
pub mod config;
pub(crate) mod errors;
pub mod http;
pub mod observability;
pub mod wiring;

// Re-export commonly used items
pub use api::{AccessTokenProvider, ApiClient, RestAuthBackend, Transport};
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use wiring::{open_store, ClientContext, ClientContextBuilder};
