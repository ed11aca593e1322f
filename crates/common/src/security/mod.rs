//! Security primitives for the session layer.
//!
//! Currently limited to CSPRNG token generation and constant-time
//! comparison, used by the OAuth state handshake.

pub mod random;

pub use random::{constant_time_eq, generate_token, DEFAULT_TOKEN_BYTES};
