//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] localspot_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    ///
    /// Deliberately covers both cases so login failures never reveal
    /// whether an email is registered.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Reset token unknown or past its expiry. The two cases are reported
    /// identically on purpose.
    #[error("password reset is invalid or has expired")]
    InvalidResetToken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// A message safe to show the user in a flash, with internal detail
    /// stripped.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials | Self::UserNotFound => "Invalid credentials".to_owned(),
            Self::UserAlreadyExists => "An account with this email already exists".to_owned(),
            Self::InvalidEmail(_) => "Invalid email address".to_owned(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::PasswordMismatch => "Passwords do not match".to_owned(),
            Self::InvalidResetToken => "Reset link is invalid or has expired".to_owned(),
            Self::Repository(RepositoryError::Validation(msg)) => msg.clone(),
            Self::Repository(_) | Self::PasswordHash => "Something went wrong".to_owned(),
        }
    }
}
