//! Session operation errors

use authenhub_domain::NormalizedError;
use thiserror::Error;

/// Why a session operation did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The backend (or local validation) rejected the operation.
    #[error(transparent)]
    Failed(#[from] NormalizedError),

    /// A logout happened while the operation was in flight; its result was
    /// discarded.
    #[error("operation superseded by logout")]
    Superseded,

    /// The operation needs a signed-in session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The controller has been disposed.
    #[error("session controller disposed")]
    Disposed,
}

impl SessionError {
    /// The normalized error, for failures that carry one.
    #[must_use]
    pub const fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
