//! # AuthenHub Domain
//!
//! Pure data model shared by every AuthenHub client crate.
//!
//! This crate contains:
//! - User profile and role types
//! - Request/response DTOs for the `/auth/*` backend endpoints
//! - Response envelope classification (`{code, message, data}` and friends)
//! - The normalized error shape and the raw failure union it is built from
//! - Client configuration structures and storage/error-code constants
//!
//! ## Architecture
//! - No dependencies on other AuthenHub crates
//! - No I/O; everything here is plain data plus pure helpers

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
