//! Session controller - the single writer of session state

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use authenhub_common::auth::{CallbackParams, ProviderRegistry};
use authenhub_common::{MemoryStore, OAuthStateHandshake, TokenStore};
use authenhub_domain::constants::{codes, messages};
use authenhub_domain::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, NormalizedError,
    OAuthCallbackRequest, RawFailure, RegisterRequest, ResetPasswordRequest, Role,
    SocialLoginRequest, SocialProvider, UserProfile,
};
use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::{SessionError, SessionResult};
use super::ports::{AuthBackend, BackendResult, Navigation, Navigator, NotifyLevel, Notifier};
use super::sinks::{NullNavigator, TracingNotifier};
use super::state::{Session, SessionStatus};
use crate::errors::normalize;

/// Navigation error marker for a failed OAuth round trip.
pub const OAUTH_FAILED_MARKER: &str = "oauth_failed";

/// User-initiated operations, for messages and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Login,
    Register,
    SocialLogin,
    OAuthCallback,
    ForgotPassword,
    ResetPassword,
    ChangePassword,
}

impl Operation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::SocialLogin => "social_login",
            Self::OAuthCallback => "oauth_callback",
            Self::ForgotPassword => "forgot_password",
            Self::ResetPassword => "reset_password",
            Self::ChangePassword => "change_password",
        }
    }

    /// Message for failures that are not backend answers.
    const fn fallback_message(self) -> &'static str {
        match self {
            Self::Login => messages::LOGIN_FAILED,
            Self::Register => messages::REGISTER_FAILED,
            Self::SocialLogin => messages::SOCIAL_LOGIN_FAILED,
            Self::OAuthCallback => messages::OAUTH_FAILED,
            Self::ForgotPassword | Self::ResetPassword | Self::ChangePassword => {
                messages::PROCESSING
            }
        }
    }

    /// Specific message for well-known codes of this operation.
    fn message_for(self, code: &str) -> Option<&'static str> {
        match (self, code) {
            (Self::Register, codes::USERNAME_EXISTS) => Some(messages::USERNAME_TAKEN),
            (Self::Register, codes::EMAIL_EXISTS) => Some(messages::EMAIL_TAKEN),
            (Self::ForgotPassword, codes::EMAIL_NOT_FOUND) => Some(messages::EMAIL_UNKNOWN),
            (Self::ResetPassword, codes::INVALID_TOKEN) => Some(messages::RESET_LINK_INVALID),
            _ => None,
        }
    }

    fn refine(self, failure: &RawFailure, error: NormalizedError) -> NormalizedError {
        if matches!(failure, RawFailure::Unexpected { .. }) {
            return error.with_message(self.fallback_message());
        }
        match error.error_code.as_deref().and_then(|code| self.message_for(code)) {
            Some(message) => error.with_message(message),
            None => error,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum RefreshOutcome {
    Refreshed(String),
    NoRefreshToken,
    Rejected,
    Superseded,
}

/// Owns the [`Session`] and every transition of it.
///
/// Mutating async operations run one at a time through an internal queue.
/// [`logout`](Self::logout) and [`dispose`](Self::dispose) bypass the queue
/// and invalidate whatever is in flight.
pub struct SessionController {
    backend: Arc<dyn AuthBackend>,
    tokens: Arc<TokenStore>,
    handshake: Arc<OAuthStateHandshake>,
    providers: ProviderRegistry,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<Session>,
    queue: AsyncMutex<()>,
    epoch: AtomicU64,
    disposed: AtomicBool,
    post_login_redirect: Mutex<Option<String>>,
}

/// Builder for [`SessionController`].
pub struct SessionControllerBuilder {
    backend: Arc<dyn AuthBackend>,
    tokens: Arc<TokenStore>,
    handshake: Option<Arc<OAuthStateHandshake>>,
    providers: ProviderRegistry,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl SessionControllerBuilder {
    #[must_use]
    pub fn handshake(mut self, handshake: Arc<OAuthStateHandshake>) -> Self {
        self.handshake = Some(handshake);
        self
    }

    #[must_use]
    pub fn providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Build the controller. A persisted token puts the session in the
    /// restoring state until [`SessionController::initialize`] settles it.
    pub fn build(self) -> Arc<SessionController> {
        let access_token = self.tokens.get();
        let initial = Session {
            restoring: access_token.is_some(),
            refresh_token: self.tokens.refresh_token(),
            access_token,
            ..Session::default()
        };
        let (state, _) = watch::channel(initial);
        let handshake = self
            .handshake
            .unwrap_or_else(|| Arc::new(OAuthStateHandshake::new(Arc::new(MemoryStore::new()))));

        Arc::new(SessionController {
            backend: self.backend,
            tokens: self.tokens,
            handshake,
            providers: self.providers,
            notifier: self.notifier,
            navigator: self.navigator,
            state,
            queue: AsyncMutex::new(()),
            epoch: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            post_login_redirect: Mutex::new(None),
        })
    }
}

impl SessionController {
    /// Start building a controller over `backend` and `tokens`.
    ///
    /// Notifications default to tracing events and navigation is ignored.
    pub fn builder(
        backend: Arc<dyn AuthBackend>,
        tokens: Arc<TokenStore>,
    ) -> SessionControllerBuilder {
        SessionControllerBuilder {
            backend,
            tokens,
            handshake: None,
            providers: ProviderRegistry::new(),
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(NullNavigator),
        }
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receive every state change. The receiver sees the current state first.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Token store backing this session; the HTTP client reads credentials
    /// from here.
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Identifies the current sign-in. It changes when a session ends or a
    /// new one is established; token refreshes keep it.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.current_epoch()
    }

    /// Dismiss the last error and its field errors.
    pub fn clear_errors(&self) {
        self.state.send_if_modified(|s| {
            if s.last_error.is_none() && s.field_errors.is_none() {
                return false;
            }
            s.clear_error();
            true
        });
    }

    /// Location to open after the next successful sign-in instead of home.
    pub fn set_post_login_redirect(&self, location: Option<String>) {
        *self.post_login_redirect.lock() = location;
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Validate a persisted token by fetching the current user.
    ///
    /// A rejected token is refreshed once when a refresh token is held. Any
    /// failure clears the stored tokens and leaves the session anonymous
    /// without an error or notification. Calling again on a hydrated
    /// session is a no-op.
    ///
    /// # Errors
    /// [`SessionError::Superseded`] if a logout raced the validation,
    /// [`SessionError::Disposed`] after [`dispose`](Self::dispose).
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> SessionResult<SessionStatus> {
        self.ensure_active()?;
        let _turn = self.queue.lock().await;
        self.ensure_active()?;

        let Some(token) = self.tokens.get() else {
            self.state.send_modify(|s| s.restoring = false);
            return Ok(self.status());
        };
        {
            let current = self.state.borrow();
            if !current.restoring
                && current.current_user.is_some()
                && current.access_token.as_deref() == Some(token.as_str())
            {
                return Ok(current.status());
            }
        }

        let epoch = self.current_epoch();
        let refresh_token = self.tokens.refresh_token();
        self.state.send_modify(|s| {
            s.restoring = true;
            s.is_loading = true;
            s.access_token = Some(token.clone());
            s.refresh_token = refresh_token;
        });

        let mut result = self.backend.current_user(&token).await;
        if matches!(&result, Err(failure) if failure.is_unauthorized()) {
            debug!("Persisted token rejected; attempting refresh");
            if let RefreshOutcome::Refreshed(fresh) = self.exchange_refresh_token().await {
                result = self.backend.current_user(&fresh).await;
            }
        }

        if self.current_epoch() != epoch {
            return Err(SessionError::Superseded);
        }

        match result {
            Ok(user) => {
                info!(user = %user.username, "Session restored");
                let access_token = self.tokens.get();
                let refresh_token = self.tokens.refresh_token();
                self.state.send_modify(|s| {
                    s.access_token = access_token;
                    s.refresh_token = refresh_token;
                    s.current_user = Some(user);
                    s.is_loading = false;
                    s.restoring = false;
                });
            }
            Err(failure) => {
                debug!(status = ?failure.status(), "Session restore failed; starting anonymous");
                self.tokens.clear();
                self.state.send_replace(Session::default());
            }
        }

        Ok(self.status())
    }

    /// Tear down: in-flight results are discarded and later operations fail
    /// with [`SessionError::Disposed`]. Durable tokens are kept.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.bump_epoch();
        self.tokens.forget_cached();
        self.post_login_redirect.lock().take();
        self.state.send_replace(Session::default());
        debug!("Session controller disposed");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Sign-in
    // ------------------------------------------------------------------

    /// # Errors
    /// The normalized failure, or [`SessionError::Superseded`] /
    /// [`SessionError::Disposed`].
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> SessionResult<UserProfile> {
        self.authenticate(Operation::Login, self.backend.login(request)).await
    }

    /// # Errors
    /// As [`login`](Self::login); taken usernames and emails get specific
    /// messages.
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> SessionResult<UserProfile> {
        self.authenticate(Operation::Register, self.backend.register(request)).await
    }

    /// Exchange a provider access token obtained by the host app.
    ///
    /// # Errors
    /// As [`login`](Self::login).
    #[instrument(skip_all, fields(provider = %request.provider))]
    pub async fn social_login(&self, request: &SocialLoginRequest) -> SessionResult<UserProfile> {
        self.authenticate(Operation::SocialLogin, self.backend.social_login(request)).await
    }

    /// Issue a state nonce and return the provider authorization URL.
    ///
    /// # Errors
    /// Fails when the provider has no client configuration or the nonce
    /// could not be stored.
    pub fn begin_oauth(&self, provider: SocialProvider) -> SessionResult<Url> {
        self.ensure_active()?;

        let config = self.providers.require(provider).map_err(|err| {
            warn!(error = %err, "OAuth sign-in requested for unconfigured provider");
            NormalizedError::new(messages::PROVIDER_UNAVAILABLE, 0)
                .with_code(codes::PROVIDER_NOT_CONFIGURED)
        })?;
        let state = self.handshake.issue().map_err(|err| {
            warn!(error = %err, "Failed to persist OAuth state");
            NormalizedError::new(messages::OAUTH_FAILED, 0).with_code(codes::STORAGE_ERROR)
        })?;
        let url = config.authorization_url(&state).map_err(|err| {
            warn!(error = %err, "Invalid provider authorization URL");
            NormalizedError::new(messages::OAUTH_FAILED, 0).with_code(codes::INVALID_CALLBACK)
        })?;

        debug!(%provider, "OAuth redirect prepared");
        Ok(url)
    }

    /// Finish an OAuth redirect.
    ///
    /// The state nonce is verified (and consumed) before anything else; a
    /// forged or stale callback never reaches the backend. Every failure
    /// also navigates to the login view with [`OAUTH_FAILED_MARKER`].
    ///
    /// # Errors
    /// `INVALID_STATE`, `INVALID_CALLBACK`, or the backend's failure.
    #[instrument(skip_all, fields(provider = ?params.provider))]
    pub async fn complete_oauth_callback(
        &self,
        params: &CallbackParams,
    ) -> SessionResult<UserProfile> {
        self.ensure_active()?;

        if !self.handshake.verify(params.state.as_deref()) {
            warn!("OAuth callback rejected: state verification failed");
            let error =
                NormalizedError::new(messages::INVALID_STATE, 0).with_code(codes::INVALID_STATE);
            return Err(self.reject(Operation::OAuthCallback, error));
        }

        let request = match (params.code.as_deref(), params.provider, params.error.as_deref()) {
            (Some(code), Some(provider), None) => {
                self.providers.get(provider).map(|config| OAuthCallbackRequest {
                    code: code.to_string(),
                    provider,
                    redirect_uri: config.redirect_uri.clone(),
                })
            }
            _ => None,
        };
        let Some(request) = request else {
            warn!(error = ?params.error, "OAuth callback incomplete");
            let error =
                NormalizedError::new(messages::OAUTH_FAILED, 0).with_code(codes::INVALID_CALLBACK);
            return Err(self.reject(Operation::OAuthCallback, error));
        };

        self.authenticate(Operation::OAuthCallback, self.backend.oauth_callback(&request)).await
    }

    // ------------------------------------------------------------------
    // Sign-out and refresh
    // ------------------------------------------------------------------

    /// End the session immediately.
    ///
    /// Operations still in flight lose: their results are discarded.
    pub fn logout(&self) {
        if self.is_disposed() {
            return;
        }
        self.bump_epoch();
        self.tokens.clear();
        self.post_login_redirect.lock().take();
        self.state.send_replace(Session::default());

        info!("Logged out");
        self.navigator.navigate(Navigation::login());
        self.notifier.notify(NotifyLevel::Info, messages::LOGGED_OUT);
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Without a refresh token, or when the backend refuses it, the session
    /// is logged out and `false` returned.
    pub async fn refresh_access_token(&self) -> bool {
        self.refresh_after(None, None).await
    }

    /// Refresh because a request sent with `rejected` during `generation`
    /// was answered with 401.
    ///
    /// Concurrent callers are serialized: if another caller already replaced
    /// `rejected`, this returns `true` without a backend call. If the session
    /// ended or was replaced since `generation`, it returns `false` without
    /// logging out again, so the request is never resent under another
    /// sign-in.
    pub async fn refresh_after_rejection(&self, rejected: Option<&str>, generation: u64) -> bool {
        self.refresh_after(rejected, Some(generation)).await
    }

    async fn refresh_after(&self, rejected: Option<&str>, generation: Option<u64>) -> bool {
        if self.is_disposed() {
            return false;
        }
        let _turn = self.queue.lock().await;

        if generation.is_some_and(|generation| generation != self.current_epoch()) {
            debug!("Session changed since the request was sent; not refreshing");
            return false;
        }
        if let Some(rejected) = rejected {
            match self.tokens.get() {
                Some(current) if current != rejected => {
                    debug!("Access token already refreshed by another caller");
                    return true;
                }
                None => {
                    debug!("Session ended before refresh; nothing to do");
                    return false;
                }
                Some(_) => {}
            }
        }

        match self.exchange_refresh_token().await {
            RefreshOutcome::Refreshed(_) => true,
            RefreshOutcome::Superseded => false,
            RefreshOutcome::NoRefreshToken | RefreshOutcome::Rejected => {
                self.logout();
                false
            }
        }
    }

    /// Callers hold the queue.
    async fn exchange_refresh_token(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            info!("No refresh token held");
            return RefreshOutcome::NoRefreshToken;
        };

        let epoch = self.current_epoch();
        let result = self.backend.refresh(&refresh_token).await;
        if self.current_epoch() != epoch {
            return RefreshOutcome::Superseded;
        }

        let response = match result {
            Ok(response) => response,
            Err(failure) => {
                warn!(status = ?failure.status(), "Token refresh rejected");
                return RefreshOutcome::Rejected;
            }
        };

        if !self.tokens.set(&response.token) {
            return RefreshOutcome::Rejected;
        }
        if let Some(rotated) = response.refresh_token.as_deref() {
            if !self.tokens.set_refresh_token(Some(rotated)) {
                warn!("Rotated refresh token could not be persisted");
            }
        }

        let refresh_token = self.tokens.refresh_token();
        let access_token = response.token;
        self.state.send_modify(|s| {
            s.access_token = Some(access_token.clone());
            s.refresh_token = refresh_token;
        });
        info!(rotated = response.refresh_token.is_some(), "Access token refreshed");
        RefreshOutcome::Refreshed(access_token)
    }

    // ------------------------------------------------------------------
    // Password management
    // ------------------------------------------------------------------

    /// # Errors
    /// The normalized failure; unknown emails get a specific message.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, email: &str) -> SessionResult<()> {
        self.ensure_active()?;
        let request = ForgotPasswordRequest { email: email.to_string() };
        self.begin_password_operation();

        match self.backend.forgot_password(&request).await {
            Ok(()) => {
                self.finish_password_operation();
                self.notifier.notify(NotifyLevel::Success, messages::RESET_EMAIL_SENT);
                Ok(())
            }
            Err(failure) => Err(self.password_failure(Operation::ForgotPassword, &failure)),
        }
    }

    /// On success the user is sent to the login view.
    ///
    /// # Errors
    /// The normalized failure; an expired link gets a specific message.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> SessionResult<()> {
        self.ensure_active()?;
        self.begin_password_operation();

        match self.backend.reset_password(request).await {
            Ok(()) => {
                self.finish_password_operation();
                self.notifier.notify(NotifyLevel::Success, messages::PASSWORD_RESET);
                self.navigator.navigate(Navigation::login());
                Ok(())
            }
            Err(failure) => Err(self.password_failure(Operation::ResetPassword, &failure)),
        }
    }

    /// Change the signed-in user's password. A 401 is refreshed and retried
    /// once.
    ///
    /// # Errors
    /// [`SessionError::NotAuthenticated`] without a session, otherwise the
    /// normalized failure.
    #[instrument(skip_all)]
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> SessionResult<()> {
        self.ensure_active()?;
        let generation = self.generation();
        let Some(token) = self.tokens.get() else {
            self.notifier.notify(NotifyLevel::Error, messages::NOT_AUTHENTICATED);
            return Err(SessionError::NotAuthenticated);
        };
        self.begin_password_operation();

        let mut result = self.backend.change_password(&token, request).await;
        if matches!(&result, Err(failure) if failure.is_unauthorized())
            && self.refresh_after_rejection(Some(&token), generation).await
        {
            if let Some(fresh) = self.tokens.get() {
                result = self.backend.change_password(&fresh, request).await;
            }
        }

        match result {
            Ok(()) => {
                self.finish_password_operation();
                self.notifier.notify(NotifyLevel::Success, messages::PASSWORD_CHANGED);
                Ok(())
            }
            Err(failure) => Err(self.password_failure(Operation::ChangePassword, &failure)),
        }
    }

    // ------------------------------------------------------------------
    // Server-side role checks
    // ------------------------------------------------------------------

    /// Whether the backend confirms admin access. Local admin flags answer
    /// without a round trip; any failure reads as `false`.
    pub async fn verify_admin_access(&self) -> bool {
        let session = self.snapshot();
        let Some(token) = session.access_token.as_deref() else {
            return false;
        };
        if session.is_admin() {
            return true;
        }

        match self.backend.check_role(token).await {
            Ok(check) => check.is_admin,
            Err(failure) => {
                warn!(status = ?failure.status(), "Admin access check failed");
                false
            }
        }
    }

    /// Whether the backend confirms the user holds `role`.
    pub async fn verify_role(&self, role: &Role) -> bool {
        let session = self.snapshot();
        let Some(token) = session.access_token.as_deref() else {
            return false;
        };
        if session.has_role(role) {
            return true;
        }

        match self.backend.check_role(token).await {
            Ok(check) => {
                check.role.as_ref() == Some(role) || (*role == Role::Admin && check.is_admin)
            }
            Err(failure) => {
                warn!(status = ?failure.status(), %role, "Role check failed");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn authenticate<F>(&self, op: Operation, call: F) -> SessionResult<UserProfile>
    where
        F: Future<Output = BackendResult<AuthResponse>> + Send,
    {
        self.ensure_active()?;
        let _turn = self.queue.lock().await;
        self.ensure_active()?;

        let epoch = self.current_epoch();
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.clear_error();
        });

        let result = call.await;
        if self.current_epoch() != epoch {
            debug!(%op, "Result discarded; session ended while in flight");
            return Err(SessionError::Superseded);
        }

        match result {
            Ok(response) => self.establish(op, response),
            Err(failure) => {
                let error = op.refine(&failure, normalize(&failure));
                warn!(
                    %op,
                    status = error.status_code,
                    code = ?error.error_code,
                    "Authentication failed"
                );
                Err(self.reject(op, error))
            }
        }
    }

    fn establish(&self, op: Operation, response: AuthResponse) -> SessionResult<UserProfile> {
        if !self.tokens.set(&response.token) {
            // The store no longer holds a usable credential; neither may the session.
            self.tokens.clear();
            self.state.send_modify(|s| {
                s.access_token = None;
                s.refresh_token = None;
                s.current_user = None;
            });
            self.bump_epoch();
            let error = NormalizedError::new(messages::SESSION_NOT_SAVED, 0)
                .with_code(codes::STORAGE_ERROR);
            return Err(self.reject(op, error));
        }
        if !self.tokens.set_refresh_token(response.refresh_token.as_deref()) {
            warn!(%op, "Refresh token could not be persisted; session will not be refreshable");
        }
        self.bump_epoch();

        let AuthResponse { token, user, .. } = response;
        self.state.send_replace(Session {
            access_token: Some(token),
            refresh_token: self.tokens.refresh_token(),
            current_user: Some(user.clone()),
            ..Session::default()
        });

        info!(%op, user = %user.username, role = %user.role, "Authenticated");
        let greeting = match op {
            Operation::Register => messages::REGISTERED.to_string(),
            _ => format!("Welcome back, {}!", user.display_name()),
        };
        self.notifier.notify(NotifyLevel::Success, &greeting);

        let destination = match self.post_login_redirect.lock().take() {
            Some(location) => Navigation::To(location),
            None => Navigation::Home,
        };
        self.navigator.navigate(destination);

        Ok(user)
    }

    /// Record `error` as the session's last error and tell the user.
    fn reject(&self, op: Operation, error: NormalizedError) -> SessionError {
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.record_error(&error);
        });
        self.notifier.notify(NotifyLevel::Error, &error.message);
        if op == Operation::OAuthCallback {
            self.navigator.navigate(Navigation::Login {
                redirect: None,
                error: Some(OAUTH_FAILED_MARKER.to_string()),
            });
        }
        SessionError::Failed(error)
    }

    fn begin_password_operation(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.clear_error();
        });
    }

    fn finish_password_operation(&self) {
        self.state.send_modify(|s| s.is_loading = false);
    }

    fn password_failure(&self, op: Operation, failure: &RawFailure) -> SessionError {
        let error = op.refine(failure, normalize(failure));
        warn!(
            %op,
            status = error.status_code,
            code = ?error.error_code,
            "Password operation failed"
        );
        self.reject(op, error)
    }

    fn ensure_active(&self) -> SessionResult<()> {
        if self.is_disposed() {
            Err(SessionError::Disposed)
        } else {
            Ok(())
        }
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn bump_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &*self.state.borrow())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn failure(status: u16, code: &str) -> RawFailure {
        RawFailure::Response {
            status,
            body: Some(json!({"message": "backend text", "errorCode": code})),
        }
    }

    #[test]
    fn refine_maps_codes_per_operation() {
        let taken = failure(400, codes::EMAIL_EXISTS);
        let refined = Operation::Register.refine(&taken, normalize(&taken));
        assert_eq!(refined.message, messages::EMAIL_TAKEN);
        assert!(refined.is(codes::EMAIL_EXISTS));

        // Same code, different operation: backend text stays.
        let kept = Operation::Login.refine(&taken, normalize(&taken));
        assert_eq!(kept.message, "backend text");

        let expired = failure(400, codes::INVALID_TOKEN);
        let refined = Operation::ResetPassword.refine(&expired, normalize(&expired));
        assert_eq!(refined.message, messages::RESET_LINK_INVALID);
    }

    #[test]
    fn refine_replaces_unexpected_failures() {
        let failure = RawFailure::Unexpected { detail: "missing field `token`".into() };

        for (op, expected) in [
            (Operation::Login, messages::LOGIN_FAILED),
            (Operation::Register, messages::REGISTER_FAILED),
            (Operation::SocialLogin, messages::SOCIAL_LOGIN_FAILED),
            (Operation::OAuthCallback, messages::OAUTH_FAILED),
        ] {
            assert_eq!(op.refine(&failure, normalize(&failure)).message, expected, "{op}");
        }
    }

    #[test]
    fn transport_failures_keep_connectivity_message() {
        let failure = RawFailure::NoResponse { detail: "dns".into() };
        let refined = Operation::Login.refine(&failure, normalize(&failure));

        assert_eq!(refined.message, messages::NO_RESPONSE);
        assert_eq!(refined.status_code, 0);
    }
}
