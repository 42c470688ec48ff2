//! Database operations for the Localspot `PostgreSQL` database.
//!
//! # Tables
//!
//! - `site_user` - Accounts, credential hashes, and reset-token state
//! - `user_heart` - A user's hearted stores (set semantics via composite key)
//! - `store` - Stores with slug, tags, and geolocation
//! - `review` - 1-5 star reviews attached to a store and an author
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! Repositories are constructed per call site from the shared pool and
//! enforce the standing policies the rest of the code relies on: slugs are
//! derived and deduplicated on create, store reads carry their author and
//! reviews, and review authorship is fixed server-side.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p localspot-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod reviews;
pub mod stores;
pub mod users;

pub use reviews::ReviewRepository;
pub use stores::StoreRepository;
pub use users::UserRepository;

/// Errors produced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated (duplicate email or slug).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requested row does not exist.
    #[error("not found")]
    NotFound,

    /// The caller is not allowed to perform this write.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Input failed validation before any write was attempted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stored value could not be interpreted.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error to `Conflict` when it is a unique violation.
pub(crate) fn map_unique_violation(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
