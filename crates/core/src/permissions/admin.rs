//! Admin area permission matrix
//!
//! Each section/action pair lists the tags that unlock it; holding any one
//! is enough. Pairs missing from the table are open, matching the
//! empty-list rule in [`has_any_permission`](super::has_any_permission).

use std::fmt;

use authenhub_domain::UserProfile;

use super::has_any_permission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminSection {
    Dashboard,
    Users,
    Analytics,
    Settings,
    Proxies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
    View,
    Overview,
    Statistics,
    Create,
    Edit,
    Delete,
    Roles,
    Traffic,
    Users,
    Reports,
    General,
    Security,
    Notifications,
    Import,
}

impl AdminSection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Users => "users",
            Self::Analytics => "analytics",
            Self::Settings => "settings",
            Self::Proxies => "proxies",
        }
    }
}

impl fmt::Display for AdminSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags that unlock `action` in `section`; empty when unrestricted.
#[must_use]
pub fn required_permissions(section: AdminSection, action: AdminAction) -> &'static [&'static str] {
    use AdminAction as A;
    use AdminSection as S;

    match (section, action) {
        (S::Dashboard, A::View | A::Overview) => &["admin:dashboard", "admin:view", "admin:all"],
        (S::Dashboard, A::Statistics) => &["admin:statistics", "admin:view", "admin:all"],

        (S::Users, A::View) => &["user:read", "user:manage", "admin:all"],
        (S::Users, A::Create) => &["user:create", "user:manage", "admin:all"],
        (S::Users, A::Edit) => &["user:edit", "user:manage", "admin:all"],
        (S::Users, A::Delete) => &["user:delete", "user:manage", "admin:all"],
        (S::Users, A::Roles) => &["role:read", "role:manage", "admin:all"],

        (S::Analytics, A::View) => &["analytics:view", "analytics:manage", "admin:all"],
        (S::Analytics, A::Traffic) => &["analytics:traffic", "analytics:view", "admin:all"],
        (S::Analytics, A::Users) => &["analytics:users", "analytics:view", "admin:all"],
        (S::Analytics, A::Reports) => &["analytics:reports", "analytics:view", "admin:all"],

        (S::Settings, A::View) => &["settings:view", "settings:manage", "admin:all"],
        (S::Settings, A::General) => &["settings:general", "settings:view", "admin:all"],
        (S::Settings, A::Security) => &["settings:security", "settings:view", "admin:all"],
        (S::Settings, A::Notifications) => {
            &["settings:notifications", "settings:view", "admin:all"]
        }

        (S::Proxies, A::View) => &["proxy:read", "proxy:manage", "admin:all"],
        (S::Proxies, A::Create) => &["proxy:create", "proxy:manage", "admin:all"],
        (S::Proxies, A::Edit) => &["proxy:edit", "proxy:manage", "admin:all"],
        (S::Proxies, A::Delete) => &["proxy:delete", "proxy:manage", "admin:all"],
        (S::Proxies, A::Import) => &["proxy:import", "proxy:manage", "admin:all"],

        _ => &[],
    }
}

/// Whether `user` may perform `action` in `section`.
#[must_use]
pub fn can(user: Option<&UserProfile>, section: AdminSection, action: AdminAction) -> bool {
    has_any_permission(user, required_permissions(section, action))
}
