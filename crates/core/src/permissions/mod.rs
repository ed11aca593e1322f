//! Permission evaluation
//!
//! Pure functions over the current profile. `None` means nobody is signed
//! in, which denies everything except the empty-list checks: an empty
//! requirement list always grants.

mod admin;

use authenhub_domain::{Role, UserProfile};

pub use admin::{can, AdminAction, AdminSection};

/// Literal permission tags that also mark an administrator.
const ADMIN_TAGS: [&str; 2] = ["admin", "role:admin"];

/// Substring that marks a catch-all admin grant (`admin:all`, `tenant:admin:all`).
const ADMIN_ALL: &str = "admin:all";

/// Whether the user is an administrator by role or by permission tag.
#[must_use]
pub fn is_admin(user: Option<&UserProfile>) -> bool {
    let Some(user) = user else {
        return false;
    };
    if user.role == Role::Admin {
        return true;
    }
    user.permissions.as_ref().is_some_and(|permissions| {
        ADMIN_TAGS.iter().any(|tag| permissions.contains(*tag))
            || permissions.iter().any(|p| p.contains(ADMIN_ALL))
    })
}

/// Admins hold every permission.
#[must_use]
pub fn has_permission(user: Option<&UserProfile>, permission: &str) -> bool {
    is_admin(user) || user.is_some_and(|u| u.holds(permission))
}

#[must_use]
pub fn has_any_permission<S: AsRef<str>>(user: Option<&UserProfile>, permissions: &[S]) -> bool {
    permissions.is_empty()
        || is_admin(user)
        || permissions.iter().any(|p| has_permission(user, p.as_ref()))
}

#[must_use]
pub fn has_all_permissions<S: AsRef<str>>(user: Option<&UserProfile>, permissions: &[S]) -> bool {
    permissions.is_empty()
        || is_admin(user)
        || permissions.iter().all(|p| has_permission(user, p.as_ref()))
}

#[must_use]
pub fn has_role(user: Option<&UserProfile>, role: &Role) -> bool {
    user.is_some_and(|u| &u.role == role)
}
