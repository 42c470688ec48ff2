//! CLI command implementations.

pub mod migrate;
pub mod seed;

use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Auth error: {0}")]
    Auth(#[from] localspot_web::services::auth::AuthError),

    #[error("Repository error: {0}")]
    Repository(#[from] localspot_web::db::RepositoryError),

    #[error("Invalid email: {0}")]
    Email(#[from] localspot_core::EmailError),
}

/// Connect to the database named by `LOCALSPOT_DATABASE_URL`, falling back
/// to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("LOCALSPOT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("LOCALSPOT_DATABASE_URL"))?;

    Ok(PgPool::connect(&database_url).await?)
}
