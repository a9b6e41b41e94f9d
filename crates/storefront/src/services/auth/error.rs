//! Auth provider error types.

use thiserror::Error;

/// Errors that can occur when resolving a session with the auth provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The access token is expired, revoked or malformed.
    #[error("invalid or expired access token")]
    InvalidToken,

    /// The provider answered with an unexpected status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The provider returned a user without a usable email.
    #[error("invalid email from auth provider: {0}")]
    InvalidEmail(#[from] bramble_core::EmailError),

    /// Failed to parse the response.
    #[error("Parse error: {0}")]
    Parse(String),
}
