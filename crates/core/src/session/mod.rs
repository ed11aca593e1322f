//! Session management
//!
//! ## Features
//!
//! - **Controller**: login, register, social and OAuth sign-in, logout,
//!   hydration of a persisted token, refresh with single-flight semantics
//! - **State**: an observable [`Session`] published over a tokio `watch`
//!   channel
//! - **Ports**: [`AuthBackend`](ports::AuthBackend), [`Notifier`](ports::Notifier),
//!   [`Navigator`](ports::Navigator)
//!
//! ## Architecture
//!
//! ```text
//! UI ──> SessionController ──> AuthBackend (REST in authenhub-infra)
//!             │   │
//!             │   └──> TokenStore / OAuthStateHandshake (authenhub-common)
//!             └──> watch::Sender<Session> ──> guards, HTTP client, views
//! ```

pub mod controller;
pub mod error;
pub mod ports;
pub mod sinks;
pub mod state;

pub use controller::{SessionController, SessionControllerBuilder, OAUTH_FAILED_MARKER};
pub use error::{SessionError, SessionResult};
pub use sinks::{NullNavigator, TracingNotifier};
pub use state::{Session, SessionStatus};
