//! Service-level error signals
//!
//! Every failure the user and auth services can report to a caller.

use crate::password::PasswordError;
use crate::repository::RepositoryError;
use crate::user::FieldErrors;
use thiserror::Error;

/// Typed failure signals surfaced by [`crate::UserService`] and
/// [`crate::AuthService`]
#[derive(Error, Debug)]
pub enum WardenError {
    /// One or more fields failed validation; carries every failing field
    #[error("Invalid user data")]
    InvalidInput(FieldErrors),

    #[error("Email is already registered")]
    DuplicateEmail,

    /// Wrong email or wrong password, deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Malformed, expired or wrongly signed token
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    NotFound,

    #[error("Failed to delete user")]
    DeletionFailed,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, WardenError>;

impl From<PasswordError> for WardenError {
    fn from(err: PasswordError) -> Self {
        WardenError::Internal(err.to_string())
    }
}

impl From<RepositoryError> for WardenError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateKey(_) => WardenError::DuplicateEmail,
            RepositoryError::NotFound => WardenError::NotFound,
            other => WardenError::Internal(other.to_string()),
        }
    }
}
