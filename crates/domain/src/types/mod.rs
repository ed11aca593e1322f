//! Domain types and models

pub mod auth;
pub mod envelope;
pub mod failure;
pub mod user;

pub use auth::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    OAuthCallbackRequest, RefreshResponse, RegisterRequest, ResetPasswordRequest, RoleCheck,
    SocialLoginRequest, SocialProvider,
};
pub use envelope::{Envelope, EnvelopeRejection};
pub use failure::{FieldErrors, NormalizedError, RawFailure};
pub use user::{Role, UserProfile};
