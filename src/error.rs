//! Error types for ManageMe.

use thiserror::Error;

use crate::auth::validation::ValidationError;

/// Common error type for ManageMe.
#[derive(Error, Debug)]
pub enum ManageMeError {
    /// Client-side validation failed. The action is blocked and nothing
    /// was sent to the server.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The server rejected the current credential (401).
    ///
    /// The session is cleared and the user is sent back to the sign-in screen.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    /// Any other API failure. Carries the server-provided message.
    #[error("{0}")]
    RequestFailed(String),

    /// The stored credential could not be decoded.
    ///
    /// Handled exactly like [`ManageMeError::AuthorizationDenied`].
    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ManageMeError {
    /// Whether this error invalidates the current session.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            ManageMeError::AuthorizationDenied(_) | ManageMeError::MalformedCredential(_)
        )
    }
}

/// Result type alias for ManageMe operations.
pub type Result<T> = std::result::Result<T, ManageMeError>;
