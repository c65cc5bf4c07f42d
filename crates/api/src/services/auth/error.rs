//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::MIN_PASSWORD_LENGTH;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password. One variant for both so responses never
    /// reveal whether the email exists.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email is already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Password does not meet the minimum length
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// Email failed validation
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] helpnet_core::EmailError),

    /// Password hashing failed
    #[error("Password hashing failed")]
    Hashing,

    /// Token signing or verification failed
    #[error("Invalid or expired token")]
    Token,

    /// Database error
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
