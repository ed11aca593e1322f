//! Modular common utilities shared across AuthenHub crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: random tokens, clocks, OAuth provider URLs
//! - `runtime`: durable storage, token store, OAuth state handshake
//! - `platform`: platform keychain storage
//! - `observability`: tracing (pulled in by `runtime`)
//! - `test-utils`: mock clock and failure-injecting storage

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod security;
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;
#[cfg(feature = "runtime")]
pub mod storage;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(all(feature = "runtime", any(feature = "test-utils", test)))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use auth::{OAuthStateHandshake, TokenStore};
#[cfg(feature = "runtime")]
pub use storage::{KeyValueStore, MemoryStore, StorageError};
#[cfg(feature = "foundation")]
pub use time::{Clock, SystemClock};
