//! Backend API access
//!
//! - [`Transport`]: base URL, request ids, envelope unwrapping
//! - [`RestAuthBackend`]: the `/auth/*` endpoints behind the session
//!   controller
//! - [`ApiClient`]: authenticated calls with a single refresh-and-retry on 401

pub mod auth;
pub mod client;
pub mod transport;

pub use auth::{AccessTokenProvider, RestAuthBackend};
pub use client::ApiClient;
pub use transport::{Transport, REQUEST_ID_HEADER};
