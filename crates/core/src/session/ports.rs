//! Port interfaces for the session controller
//!
//! The controller never talks HTTP or touches UI directly. It reaches the
//! backend through [`AuthBackend`], shows messages through [`Notifier`] and
//! changes views through [`Navigator`].

use async_trait::async_trait;
use authenhub_domain::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    OAuthCallbackRequest, RawFailure, RefreshResponse, RegisterRequest, ResetPasswordRequest,
    RoleCheck, SocialLoginRequest, UserProfile,
};

/// Result of a backend call: the decoded payload or the un-normalized failure.
pub type BackendResult<T> = std::result::Result<T, RawFailure>;

/// The `/auth/*` endpoints.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, request: &LoginRequest) -> BackendResult<AuthResponse>;

    /// `POST /auth/register`
    async fn register(&self, request: &RegisterRequest) -> BackendResult<AuthResponse>;

    /// `POST /auth/social-login`
    async fn social_login(&self, request: &SocialLoginRequest) -> BackendResult<AuthResponse>;

    /// `POST /auth/oauth2/callback`
    async fn oauth_callback(&self, request: &OAuthCallbackRequest) -> BackendResult<AuthResponse>;

    /// `GET /auth/me` with `token` as bearer
    async fn current_user(&self, token: &str) -> BackendResult<UserProfile>;

    /// `POST /auth/refresh-token` with the refresh token as bearer
    async fn refresh(&self, refresh_token: &str) -> BackendResult<RefreshResponse>;

    /// `POST /auth/forgot-password`
    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> BackendResult<()>;

    /// `POST /auth/reset-password`
    async fn reset_password(&self, request: &ResetPasswordRequest) -> BackendResult<()>;

    /// `POST /auth/change-password`
    async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> BackendResult<()>;

    /// `GET /auth/check-role`
    async fn check_role(&self, token: &str) -> BackendResult<RoleCheck>;
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Toast/snackbar sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotifyLevel, message: &str);
}

/// Where the controller wants the UI to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The login view, optionally remembering the requested location or an
    /// error marker (`oauth_failed`).
    Login { redirect: Option<String>, error: Option<String> },
    Home,
    /// A specific location, e.g. the page that triggered a login redirect.
    To(String),
}

impl Navigation {
    #[must_use]
    pub const fn login() -> Self {
        Self::Login { redirect: None, error: None }
    }
}

/// Router sink.
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Navigation);
}
