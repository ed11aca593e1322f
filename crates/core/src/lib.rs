//! # AuthenHub Core
//!
//! Session and permission logic - no HTTP, storage or UI code.
//!
//! This crate contains:
//! - The error normalizer (raw backend failures to [`NormalizedError`])
//! - Permission evaluation and the admin section matrix
//! - The session controller state machine
//! - The route guard
//! - Ports for the backend, notifications and navigation
//!
//! ## Architecture Principles
//! - Depends on `authenhub-common` (storage seams) and `authenhub-domain`
//! - The backend is reached only through [`AuthBackend`]
//! - UI side effects go through [`Notifier`] and [`Navigator`]
//!
//! [`NormalizedError`]: authenhub_domain::NormalizedError

pub mod errors;
pub mod guard;
pub mod permissions;
pub mod session;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export specific items to avoid ambiguity
pub use errors::normalize;
pub use guard::{GuardDecision, RouteGuard, RouteRequirements, RouteTable};
pub use permissions::{AdminAction, AdminSection};
pub use session::ports::{AuthBackend, Navigation, Navigator, NotifyLevel, Notifier};
pub use session::{Session, SessionController, SessionError, SessionStatus};
