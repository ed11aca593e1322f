use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use authenhub_domain::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    OAuthCallbackRequest, RawFailure, RefreshResponse, RegisterRequest, ResetPasswordRequest,
    RoleCheck, SocialLoginRequest, UserProfile,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::session::ports::{AuthBackend, BackendResult};

/// Backend endpoint, for scripting and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Register,
    SocialLogin,
    OAuthCallback,
    CurrentUser,
    Refresh,
    ForgotPassword,
    ResetPassword,
    ChangePassword,
    CheckRole,
}

type Scripted = Result<Value, RawFailure>;

#[derive(Default)]
struct Inner {
    responses: HashMap<Endpoint, VecDeque<Scripted>>,
    calls: HashMap<Endpoint, Vec<Option<String>>>,
    delays: HashMap<Endpoint, Duration>,
}

/// Scripted [`AuthBackend`].
///
/// Responses are queued per endpoint as JSON and consumed in order; the last
/// one repeats. Unscripted endpoints fail as unexpected.
#[derive(Clone, Default)]
pub struct MockAuthBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MockAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful payload.
    pub fn respond(&self, endpoint: Endpoint, payload: Value) -> &Self {
        self.push(endpoint, Ok(payload))
    }

    /// Queue a failure.
    pub fn fail(&self, endpoint: Endpoint, failure: RawFailure) -> &Self {
        self.push(endpoint, Err(failure))
    }

    /// Queue an HTTP failure with a JSON body.
    pub fn fail_with(&self, endpoint: Endpoint, status: u16, body: Value) -> &Self {
        self.fail(endpoint, RawFailure::Response { status, body: Some(body) })
    }

    /// Delay every call to `endpoint`.
    pub fn delay(&self, endpoint: Endpoint, delay: Duration) -> &Self {
        self.inner.lock().delays.insert(endpoint, delay);
        self
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.inner.lock().calls.get(&endpoint).map_or(0, Vec::len)
    }

    /// Bearer tokens passed to `endpoint`, in call order.
    pub fn tokens_sent(&self, endpoint: Endpoint) -> Vec<Option<String>> {
        self.inner.lock().calls.get(&endpoint).cloned().unwrap_or_default()
    }

    fn push(&self, endpoint: Endpoint, scripted: Scripted) -> &Self {
        self.inner.lock().responses.entry(endpoint).or_default().push_back(scripted);
        self
    }

    async fn answer<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        token: Option<&str>,
    ) -> BackendResult<T> {
        let (scripted, delay) = {
            let mut inner = self.inner.lock();
            inner.calls.entry(endpoint).or_default().push(token.map(str::to_string));
            let delay = inner.delays.get(&endpoint).copied();
            let queue = inner.responses.entry(endpoint).or_default();
            let scripted = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
            (scripted, delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match scripted {
            Some(Ok(payload)) => serde_json::from_value(payload)
                .map_err(|err| RawFailure::Unexpected { detail: err.to_string() }),
            Some(Err(failure)) => Err(failure),
            None => Err(RawFailure::Unexpected {
                detail: format!("no response scripted for {endpoint:?}"),
            }),
        }
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn login(&self, _request: &LoginRequest) -> BackendResult<AuthResponse> {
        self.answer(Endpoint::Login, None).await
    }

    async fn register(&self, _request: &RegisterRequest) -> BackendResult<AuthResponse> {
        self.answer(Endpoint::Register, None).await
    }

    async fn social_login(&self, request: &SocialLoginRequest) -> BackendResult<AuthResponse> {
        self.answer(Endpoint::SocialLogin, Some(&request.access_token)).await
    }

    async fn oauth_callback(&self, request: &OAuthCallbackRequest) -> BackendResult<AuthResponse> {
        self.answer(Endpoint::OAuthCallback, Some(&request.code)).await
    }

    async fn current_user(&self, token: &str) -> BackendResult<UserProfile> {
        self.answer(Endpoint::CurrentUser, Some(token)).await
    }

    async fn refresh(&self, refresh_token: &str) -> BackendResult<RefreshResponse> {
        self.answer(Endpoint::Refresh, Some(refresh_token)).await
    }

    async fn forgot_password(&self, _request: &ForgotPasswordRequest) -> BackendResult<()> {
        self.answer(Endpoint::ForgotPassword, None).await
    }

    async fn reset_password(&self, _request: &ResetPasswordRequest) -> BackendResult<()> {
        self.answer(Endpoint::ResetPassword, None).await
    }

    async fn change_password(
        &self,
        token: &str,
        _request: &ChangePasswordRequest,
    ) -> BackendResult<()> {
        self.answer(Endpoint::ChangePassword, Some(token)).await
    }

    async fn check_role(&self, token: &str) -> BackendResult<RoleCheck> {
        self.answer(Endpoint::CheckRole, Some(token)).await
    }
}

/// `AuthResponse` payload for `username` with the given role.
pub fn auth_payload(token: &str, refresh_token: Option<&str>, username: &str, role: &str) -> Value {
    json!({
        "token": token,
        "refreshToken": refresh_token,
        "user": {
            "id": 1,
            "username": username,
            "email": format!("{username}@example.com"),
            "role": role
        }
    })
}
