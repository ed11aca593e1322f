//! Named application routes and their requirements.

use super::RouteRequirements;

/// Prefix of the admin area.
pub const ADMIN_AREA: &str = "/admin";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Route {
    name: String,
    pattern: String,
    requirements: RouteRequirements,
}

impl Route {
    /// `:param` segments match any single non-empty segment.
    fn matches(&self, path: &str) -> bool {
        let mut pattern = segments(&self.pattern);
        let mut path = segments(path);
        loop {
            match (pattern.next(), path.next()) {
                (None, None) => return true,
                (Some(expected), Some(actual)) => {
                    if !expected.starts_with(':') && expected != actual {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['?', '#']).next().unwrap_or_default().split('/').filter(|s| !s.is_empty())
}

/// Ordered route table; the first matching pattern wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The portal's routes: public home, guest-only auth pages, the profile,
    /// the OAuth callback and the admin area.
    #[must_use]
    pub fn standard() -> Self {
        let guest = RouteRequirements::guest;
        let admin = RouteRequirements::admin;

        let mut table = Self::new()
            .route("home", "/", RouteRequirements::public())
            .route("login", "/login", guest())
            .route("register", "/register", guest())
            .route("forgot-password", "/forgot-password", guest())
            .route("reset-password", "/reset-password", guest())
            .route("profile", "/profile", RouteRequirements::authenticated())
            .route("oauth-callback", "/oauth/callback/:provider", RouteRequirements::public());

        for section in [
            "",
            "/overview",
            "/statistics",
            "/users",
            "/users/list",
            "/users/roles",
            "/users/invites",
            "/users/new",
            "/analytics",
            "/analytics/traffic",
            "/analytics/users",
            "/analytics/reports",
            "/analytics/reports/new",
            "/settings",
            "/settings/general",
            "/settings/security",
            "/settings/appearance",
            "/settings/notifications",
        ] {
            let path = format!("{ADMIN_AREA}{section}");
            let name = format!("admin{}", section.replace('/', "-"));
            table = table.route(name, path, admin());
        }
        table
    }

    /// Append a route.
    #[must_use]
    pub fn route(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        requirements: RouteRequirements,
    ) -> Self {
        self.routes.push(Route { name: name.into(), pattern: pattern.into(), requirements });
        self
    }

    /// Requirements for `location`; unknown locations are public.
    #[must_use]
    pub fn requirements_for(&self, location: &str) -> RouteRequirements {
        self.routes
            .iter()
            .find(|route| route.matches(location))
            .map(|route| route.requirements.clone())
            .unwrap_or_default()
    }

    /// Name of the route matching `location`.
    #[must_use]
    pub fn name_of(&self, location: &str) -> Option<&str> {
        self.routes.iter().find(|route| route.matches(location)).map(|route| route.name.as_str())
    }

    /// Path registered under `name`.
    #[must_use]
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.routes.iter().find(|route| route.name == name).map(|route| route.pattern.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_requirements() {
        let table = RouteTable::standard();

        assert_eq!(table.requirements_for("/"), RouteRequirements::public());
        assert_eq!(table.requirements_for("/login"), RouteRequirements::guest());
        assert_eq!(table.requirements_for("/profile"), RouteRequirements::authenticated());
        assert_eq!(table.requirements_for("/admin/settings/security"), RouteRequirements::admin());
        assert_eq!(table.name_of("/admin/users/new"), Some("admin-users-new"));
        assert_eq!(table.path_of("admin"), Some("/admin"));
    }

    #[test]
    fn query_and_trailing_slash_are_ignored() {
        let table = RouteTable::standard();

        assert_eq!(table.name_of("/profile/?tab=security"), Some("profile"));
        assert_eq!(table.name_of("/reset-password?token=abc#top"), Some("reset-password"));
    }

    #[test]
    fn params_match_single_segment() {
        let table = RouteTable::standard();

        assert_eq!(table.name_of("/oauth/callback/google?code=x"), Some("oauth-callback"));
        assert_eq!(table.name_of("/oauth/callback"), None);
        assert_eq!(table.name_of("/oauth/callback/google/extra"), None);
    }

    #[test]
    fn unknown_locations_are_public() {
        let table = RouteTable::standard();

        assert_eq!(table.requirements_for("/pricing"), RouteRequirements::public());
        assert!(RouteTable::new().is_empty());
    }
}
