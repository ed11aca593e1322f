//! Route guard
//!
//! Decides whether navigation to a location may proceed. Evaluation is a
//! pure function of the current [`Session`]; [`RouteGuard::decide`] only
//! adds waiting for a persisted session to finish restoring.

mod routes;

use std::sync::Arc;

use tracing::debug;

pub use routes::{RouteTable, ADMIN_AREA};

use crate::session::ports::Navigation;
use crate::session::{Session, SessionController};

/// What a route demands of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequirements {
    pub requires_auth: bool,
    /// Only administrators (by role or admin tag) may enter.
    pub requires_admin: bool,
    /// Any one of these grants entry; empty means no permission check.
    pub required_permissions: Vec<String>,
    /// Only signed-out visitors (login, register).
    pub guest_only: bool,
    /// Skip the permission check, e.g. for error pages.
    pub always_allowed: bool,
}

impl RouteRequirements {
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated() -> Self {
        Self { requires_auth: true, ..Self::default() }
    }

    #[must_use]
    pub fn admin() -> Self {
        Self { requires_auth: true, requires_admin: true, ..Self::default() }
    }

    #[must_use]
    pub fn guest() -> Self {
        Self { guest_only: true, ..Self::default() }
    }

    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn always_allowed(mut self) -> Self {
        self.always_allowed = true;
        self
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Sign in first, then return to `redirect`.
    RedirectLogin { redirect: String },
    RedirectHome,
}

impl GuardDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Navigation to perform instead, `None` when allowed.
    #[must_use]
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            Self::Allow => None,
            Self::RedirectLogin { redirect } => {
                Some(Navigation::Login { redirect: Some(redirect.clone()), error: None })
            }
            Self::RedirectHome => Some(Navigation::Home),
        }
    }
}

/// Evaluate `requirements` for `location` against `session`.
///
/// Checks run in order: authentication, admin, permissions, guest-only.
#[must_use]
pub fn evaluate(
    session: &Session,
    requirements: &RouteRequirements,
    location: &str,
) -> GuardDecision {
    if requirements.requires_auth && !session.is_authenticated() {
        return GuardDecision::RedirectLogin { redirect: location.to_string() };
    }
    if requirements.requires_admin && !session.is_admin() {
        return GuardDecision::RedirectHome;
    }
    if !requirements.always_allowed
        && !requirements.required_permissions.is_empty()
        && !session.has_any_permission(&requirements.required_permissions)
    {
        return GuardDecision::RedirectHome;
    }
    if requirements.guest_only && session.is_authenticated() {
        return GuardDecision::RedirectHome;
    }
    GuardDecision::Allow
}

/// Guard bound to a live session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    controller: Arc<SessionController>,
    routes: RouteTable,
}

impl RouteGuard {
    pub fn new(controller: Arc<SessionController>) -> Self {
        Self { controller, routes: RouteTable::standard() }
    }

    #[must_use]
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide for explicit requirements, restoring a persisted session first.
    pub async fn decide(&self, requirements: &RouteRequirements, location: &str) -> GuardDecision {
        if self.controller.snapshot().restoring {
            if let Err(err) = self.controller.initialize().await {
                debug!(error = %err, "Session restore did not complete before guard check");
            }
        }

        let decision = evaluate(&self.controller.snapshot(), requirements, location);
        debug!(%location, ?decision, "Route guard decision");
        decision
    }

    /// Decide for `location` using the route table.
    pub async fn decide_path(&self, location: &str) -> GuardDecision {
        let requirements = self.routes.requirements_for(location);
        self.decide(&requirements, location).await
    }
}
