//! REST implementation of the `/auth/*` endpoints
//!
//! [`RestAuthBackend`] is the production [`AuthBackend`]. It only moves
//! bytes: envelope unwrapping happens in the transport and normalization in
//! the session layer.
//!
//! [`AccessTokenProvider`] is the seam the [`ApiClient`](super::ApiClient)
//! uses to read the current bearer and ask for a refresh after a 401.

use std::sync::Arc;

use async_trait::async_trait;
use authenhub_core::session::ports::BackendResult;
use authenhub_core::{AuthBackend, SessionController};
use authenhub_domain::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    OAuthCallbackRequest, RefreshResponse, RegisterRequest, ResetPasswordRequest, RoleCheck,
    SocialLoginRequest, UserProfile,
};
use reqwest::Method;
use serde::de::IgnoredAny;
use tracing::instrument;

use super::transport::Transport;

const LOGIN: &str = "/auth/login";
const REGISTER: &str = "/auth/register";
const SOCIAL_LOGIN: &str = "/auth/social-login";
const OAUTH_CALLBACK: &str = "/auth/oauth2/callback";
const CURRENT_USER: &str = "/auth/me";
const REFRESH: &str = "/auth/refresh-token";
const FORGOT_PASSWORD: &str = "/auth/forgot-password";
const RESET_PASSWORD: &str = "/auth/reset-password";
const CHANGE_PASSWORD: &str = "/auth/change-password";
const CHECK_ROLE: &str = "/auth/check-role";

/// Trait for providing access tokens
///
/// Lets the API client run against a real [`SessionController`] or a test
/// double.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// The bearer to attach, if a session exists.
    async fn access_token(&self) -> Option<String>;

    /// Sign-in the next request belongs to; read before the bearer.
    fn generation(&self) -> u64;

    /// Called once after a 401. `rejected` is the bearer that was refused
    /// while `generation` was current. Returns `true` when a retry with a
    /// fresh token of the same sign-in is worthwhile.
    async fn refresh_after_rejection(&self, rejected: Option<&str>, generation: u64) -> bool;
}

#[async_trait]
impl AccessTokenProvider for SessionController {
    async fn access_token(&self) -> Option<String> {
        self.tokens().get()
    }

    fn generation(&self) -> u64 {
        SessionController::generation(self)
    }

    async fn refresh_after_rejection(&self, rejected: Option<&str>, generation: u64) -> bool {
        SessionController::refresh_after_rejection(self, rejected, generation).await
    }
}

/// [`AuthBackend`] over HTTP.
#[derive(Clone)]
pub struct RestAuthBackend {
    transport: Arc<Transport>,
}

impl RestAuthBackend {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    async fn discard(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &(impl serde::Serialize + Sync),
    ) -> BackendResult<()> {
        self.transport.execute::<_, IgnoredAny>(Method::POST, path, bearer, Some(body)).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for RestAuthBackend {
    #[instrument(skip_all)]
    async fn login(&self, request: &LoginRequest) -> BackendResult<AuthResponse> {
        self.transport.execute(Method::POST, LOGIN, None, Some(request)).await
    }

    #[instrument(skip_all)]
    async fn register(&self, request: &RegisterRequest) -> BackendResult<AuthResponse> {
        self.transport.execute(Method::POST, REGISTER, None, Some(request)).await
    }

    #[instrument(skip_all, fields(provider = %request.provider))]
    async fn social_login(&self, request: &SocialLoginRequest) -> BackendResult<AuthResponse> {
        self.transport.execute(Method::POST, SOCIAL_LOGIN, None, Some(request)).await
    }

    #[instrument(skip_all, fields(provider = %request.provider))]
    async fn oauth_callback(&self, request: &OAuthCallbackRequest) -> BackendResult<AuthResponse> {
        self.transport.execute(Method::POST, OAUTH_CALLBACK, None, Some(request)).await
    }

    #[instrument(skip_all)]
    async fn current_user(&self, token: &str) -> BackendResult<UserProfile> {
        self.transport.execute::<(), _>(Method::GET, CURRENT_USER, Some(token), None).await
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> BackendResult<RefreshResponse> {
        self.transport.execute::<(), _>(Method::POST, REFRESH, Some(refresh_token), None).await
    }

    #[instrument(skip_all)]
    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> BackendResult<()> {
        self.discard(FORGOT_PASSWORD, None, request).await
    }

    #[instrument(skip_all)]
    async fn reset_password(&self, request: &ResetPasswordRequest) -> BackendResult<()> {
        self.discard(RESET_PASSWORD, None, request).await
    }

    #[instrument(skip_all)]
    async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> BackendResult<()> {
        self.discard(CHANGE_PASSWORD, Some(token), request).await
    }

    #[instrument(skip_all)]
    async fn check_role(&self, token: &str) -> BackendResult<RoleCheck> {
        self.transport.execute::<(), _>(Method::GET, CHECK_ROLE, Some(token), None).await
    }
}
