//! Storage keys, backend error codes and user-facing messages.

/// Durable storage key for the access token.
pub const TOKEN_KEY: &str = "token";

/// Durable storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Durable storage key for the outstanding OAuth nonce.
pub const OAUTH_STATE_KEY: &str = "oauth_state";

/// Durable storage key for the nonce issue time (milliseconds since epoch).
pub const OAUTH_STATE_TIME_KEY: &str = "oauth_state_time";

/// Envelope code the backend uses for a successful response.
pub const SUCCESS_CODE: &str = "00";

/// Machine-readable error codes emitted by the backend or by this SDK.
pub mod codes {
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const USERNAME_EXISTS: &str = "USERNAME_EXISTS";
    pub const EMAIL_EXISTS: &str = "EMAIL_EXISTS";
    pub const EMAIL_NOT_FOUND: &str = "EMAIL_NOT_FOUND";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const NULL_POINTER_ERROR: &str = "NULL_POINTER_ERROR";
    pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
    pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";

    /// No response reached the client.
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    /// A failure that matched no known shape.
    pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
    /// OAuth callback carried a nonce that failed verification.
    pub const INVALID_STATE: &str = "INVALID_STATE";
    /// Callback URL lacked the authorization code or provider.
    pub const INVALID_CALLBACK: &str = "INVALID_CALLBACK";
    /// An authenticated operation was attempted without a session.
    pub const NOT_AUTHENTICATED: &str = "NOT_AUTHENTICATED";
    /// The token could not be written to durable storage.
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    /// Sign-in was requested for a provider with no client configuration.
    pub const PROVIDER_NOT_CONFIGURED: &str = "PROVIDER_NOT_CONFIGURED";
}

/// User-facing messages.
pub mod messages {
    pub const GENERIC: &str = "An error occurred";
    pub const PROCESSING: &str = "An error occurred while processing your request";
    pub const NO_RESPONSE: &str = "No response received from the server. Please check your internet connection and try again.";
    pub const REQUEST_SETUP: &str = "An error occurred while setting up the request";

    pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
    pub const FORBIDDEN: &str = "You do not have permission to access this resource.";
    pub const NOT_FOUND: &str = "The requested resource was not found.";
    pub const SERVER_ERROR: &str = "The server encountered an error. Please try again later.";
    pub const DATABASE_PROBLEM: &str = "There was a problem retrieving data. Please try again later.";
    pub const PROCESSING_PROBLEM: &str = "There was a problem processing your request. Please try again later.";

    pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
    pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
    pub const USERNAME_TAKEN: &str = "Username is already taken. Please choose another one.";
    pub const EMAIL_TAKEN: &str = "Email is already registered. Please use another email or log in.";
    pub const EMAIL_UNKNOWN: &str = "No account is registered with this email address.";
    pub const SOCIAL_LOGIN_FAILED: &str = "Social login failed";
    pub const OAUTH_FAILED: &str = "OAuth authentication failed. Please try again.";
    pub const INVALID_STATE: &str = "Invalid OAuth state. Please try logging in again.";
    pub const NOT_AUTHENTICATED: &str = "You must be logged in to perform this action.";
    pub const SESSION_NOT_SAVED: &str = "Your session could not be saved on this device. Please try again.";
    pub const RESET_LINK_INVALID: &str = "This password reset link is invalid or has expired.";
    pub const PROVIDER_UNAVAILABLE: &str = "This sign-in method is not available.";

    pub const REGISTERED: &str = "Registration successful! Welcome to AuthenHub.";
    pub const LOGGED_OUT: &str = "You have been logged out successfully";
    pub const PASSWORD_CHANGED: &str = "Password changed successfully";
    pub const RESET_EMAIL_SENT: &str = "Password reset instructions have been sent to your email";
    pub const PASSWORD_RESET: &str = "Your password has been reset. Please log in.";
}
