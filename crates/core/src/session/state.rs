//! Observable session state

use std::fmt;

use authenhub_domain::{FieldErrors, NormalizedError, Role, UserProfile};

use crate::permissions;

/// Coarse session status derived from [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Anonymous,
    Loading,
    Authenticated,
    Error,
}

/// In-memory session. Only the controller writes it; everyone else reads
/// snapshots or subscribes.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub current_user: Option<UserProfile>,
    pub is_loading: bool,
    /// A persisted token is being validated; guards wait for this to clear.
    pub restoring: bool,
    pub last_error: Option<NormalizedError>,
    pub field_errors: Option<FieldErrors>,
}

impl Session {
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        if self.is_loading || self.restoring {
            SessionStatus::Loading
        } else if self.access_token.is_some() && self.current_user.is_some() {
            SessionStatus::Authenticated
        } else if self.last_error.is_some() {
            SessionStatus::Error
        } else {
            SessionStatus::Anonymous
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        permissions::is_admin(self.current_user.as_ref())
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        permissions::has_permission(self.current_user.as_ref(), permission)
    }

    #[must_use]
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions::has_any_permission(self.current_user.as_ref(), permissions)
    }

    #[must_use]
    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions::has_all_permissions(self.current_user.as_ref(), permissions)
    }

    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        permissions::has_role(self.current_user.as_ref(), role)
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
        self.field_errors = None;
    }

    pub(crate) fn record_error(&mut self, error: &NormalizedError) {
        self.field_errors = error.field_errors.clone();
        self.last_error = Some(error.clone());
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status())
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("user", &self.current_user.as_ref().map(|u| &u.username))
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
