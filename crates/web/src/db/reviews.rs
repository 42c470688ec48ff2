//! Review repository.
//!
//! Reviews are written with their author and store fixed server-side and
//! always read back with the author populated.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use localspot_core::{ReviewId, StoreId, UserId};

use super::RepositoryError;
use crate::models::{Review, ReviewInput};

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    author_id: i32,
    author_name: String,
    store_id: i32,
    rating: i16,
    body: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = localspot_core::Rating::new(row.rating).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating in database: {e}"))
        })?;

        Ok(Self {
            id: ReviewId::new(row.id),
            author_id: UserId::new(row.author_id),
            author_name: row.author_name,
            store_id: StoreId::new(row.store_id),
            rating,
            body: row.body,
            created_at: row.created_at,
        })
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a review for `store_id` authored by `author_id`.
    ///
    /// The ids come from the authenticated session and the URL; anything
    /// the client put in the form besides rating and text is ignored, so
    /// authorship can't be spoofed. Foreign keys reject orphan writes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a bad rating or blank
    /// text, and `RepositoryError::NotFound` when the store or author row
    /// is gone.
    pub async fn add(
        &self,
        author_id: UserId,
        store_id: StoreId,
        input: &ReviewInput,
    ) -> Result<Review, RepositoryError> {
        let rating = input.validate()?;

        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            WITH inserted AS (
                INSERT INTO review (author_id, store_id, rating, body)
                VALUES ($1, $2, $3, $4)
                RETURNING id, author_id, store_id, rating, body, created_at
            )
            SELECT i.id, i.author_id, u.name AS author_name, i.store_id,
                   i.rating, i.body, i.created_at
            FROM inserted i
            JOIN site_user u ON u.id = i.author_id
            ",
        )
        .bind(author_id.as_i32())
        .bind(store_id.as_i32())
        .bind(rating.as_i16())
        .bind(input.trimmed_body())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// All reviews for a store, newest first, authors populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_store(&self, store_id: StoreId) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT r.id, r.author_id, u.name AS author_name, r.store_id,
                   r.rating, r.body, r.created_at
            FROM review r
            JOIN site_user u ON u.id = r.author_id
            WHERE r.store_id = $1
            ORDER BY r.created_at DESC
            ",
        )
        .bind(store_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }
}
