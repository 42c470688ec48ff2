//! Authentication service.
//!
//! Credential verification, registration, and the password-reset token
//! lifecycle. Session storage itself lives in the middleware; this service
//! only decides who is allowed in.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;

use localspot_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Entropy of a reset token, in bytes (hex-encoded to twice this length).
const RESET_TOKEN_BYTES: usize = 20;

/// How long a reset token stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email, name, and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::Repository(RepositoryError::Validation(
                "you must supply a name".to_owned(),
            )));
        }

        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any failure; callers must
    /// not distinguish "no such user" from "wrong password".
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Update the user's name and email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the new email is taken.
    pub async fn update_account(
        &self,
        user_id: UserId,
        name: &str,
        email: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::Repository(RepositoryError::Validation(
                "you must supply a name".to_owned(),
            )));
        }

        self.users
            .update_profile(user_id, name, &email)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Begin a password reset for `email`.
    ///
    /// Generates a fresh random token, stamps it with a one-hour expiry in
    /// a single update, and returns the user and token so the caller can
    /// dispatch the reset email. An unknown email returns
    /// `AuthError::UserNotFound` and leaves no state behind; the caller
    /// decides how much of that to reveal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unregistered email.
    pub async fn request_reset(&self, email: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = generate_reset_token();
        let expires = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
        self.users.set_reset_token(user.id, &token, expires).await?;

        Ok((user, token))
    }

    /// Check that `token` matches a pending reset that hasn't expired.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetToken` whether the token never
    /// existed or has expired; callers cannot tell the two apart.
    pub async fn validate_reset_token(&self, token: &str) -> Result<UserId, AuthError> {
        self.users
            .find_by_valid_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidResetToken)
    }

    /// Complete a password reset.
    ///
    /// The token and expiry are re-checked inside the same atomic update
    /// that stores the new hash and clears the token columns. An earlier
    /// `validate_reset_token` is not trusted, since time may have passed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch`, `AuthError::WeakPassword`, or
    /// `AuthError::InvalidResetToken`.
    pub async fn complete_reset(
        &self,
        token: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<User, AuthError> {
        passwords_match(new_password, confirm)?;
        validate_password(new_password)?;

        let password_hash = hash_password(new_password)?;
        self.users
            .complete_reset(token, &password_hash)
            .await?
            .ok_or(AuthError::InvalidResetToken)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Pure precondition: the password and its confirmation must agree.
///
/// # Errors
///
/// Returns `AuthError::PasswordMismatch` when they differ.
pub fn passwords_match(password: &str, confirm: &str) -> Result<(), AuthError> {
    if password == confirm {
        Ok(())
    } else {
        Err(AuthError::PasswordMismatch)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a hex-encoded reset token with [`RESET_TOKEN_BYTES`] bytes of
/// entropy.
fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("longenough").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_passwords_match() {
        assert!(passwords_match("a-password", "a-password").is_ok());
        assert!(matches!(
            passwords_match("a-password", "another"),
            Err(AuthError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_reset_token_shape() {
        let token = generate_reset_token();
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        // Two tokens colliding would mean the RNG is broken.
        assert_ne!(token, generate_reset_token());
    }
}
