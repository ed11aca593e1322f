//! Client-side credential handling
//!
//! ## Features
//!
//! - **Token Store**: access/refresh token with durable write-through
//! - **OAuth State Handshake**: one-time, time-boxed anti-forgery nonce
//! - **Providers**: Google/Facebook authorization URLs and callback parsing
//!
//! ## Architecture
//!
//! ```text
//! TokenStore ──────────┐
//!                      ├──> KeyValueStore (memory | file | keychain)
//! OAuthStateHandshake ─┘
//! ProviderRegistry ───> url::Url (no I/O)
//! ```

pub mod providers;

#[cfg(feature = "runtime")]
pub mod oauth_state;
#[cfg(feature = "runtime")]
pub mod token_store;

#[cfg(feature = "runtime")]
pub use oauth_state::{OAuthStateHandshake, DEFAULT_STATE_TTL};
pub use providers::{CallbackParams, ProviderConfig, ProviderError, ProviderRegistry};
#[cfg(feature = "runtime")]
pub use token_store::TokenStore;
