//! User repository for database operations.
//!
//! Covers account CRUD, the heart set, and the reset-token columns. The
//! queries use the runtime sqlx API with `FromRow` row structs so the
//! workspace builds without a live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use localspot_core::{Email, StoreId, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

/// Row type shared by the user queries.
///
/// Hearts are aggregated in SQL so a single round trip produces the full
/// domain object.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    name: String,
    hearts: Vec<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            hearts: row.hearts.into_iter().map(StoreId::new).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `SELECT` list used by every query that produces a [`UserRow`].
const USER_SELECT: &str = r"
    SELECT u.id, u.email, u.name,
           COALESCE(array_agg(h.store_id) FILTER (WHERE h.store_id IS NOT NULL), '{}') AS hearts,
           u.created_at, u.updated_at
    FROM site_user u
    LEFT JOIN user_heart h ON h.user_id = u.id
";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("{USER_SELECT} WHERE u.email = $1 GROUP BY u.id");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("{USER_SELECT} WHERE u.id = $1 GROUP BY u.id");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new user with hashed credentials.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO site_user (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, '{}'::int4[] AS hearts, created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .bind(name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already registered"))?;

        User::try_from(row)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct HashRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, HashRow>(
            r"
            SELECT u.id, u.email, u.name,
                   COALESCE(array_agg(h.store_id) FILTER (WHERE h.store_id IS NOT NULL), '{}') AS hearts,
                   u.created_at, u.updated_at, u.password_hash
            FROM site_user u
            LEFT JOIN user_heart h ON h.user_id = u.id
            WHERE u.email = $1
            GROUP BY u.id
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Update a user's name and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: &str,
        email: &Email,
    ) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE site_user
            SET name = $2, email = $3, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(name)
        .bind(email.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already registered"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Store a reset token and its expiry on the user, replacing any
    /// pending one.
    ///
    /// Both columns are written in a single statement so they are never
    /// observed half-set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_reset_token(
        &self,
        id: UserId,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE site_user
            SET reset_password_token = $2, reset_password_expires = $3, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(token)
        .bind(expires)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Find the user holding an unexpired reset token.
    ///
    /// Expiry is purely checked-on-read; there is no sweep process. An
    /// expired token and a token that never existed look identical here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_valid_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<UserId>, RepositoryError> {
        let id: Option<(i32,)> = sqlx::query_as(
            r"
            SELECT id FROM site_user
            WHERE reset_password_token = $1 AND reset_password_expires > now()
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(id.map(|(id,)| UserId::new(id)))
    }

    /// Set a new password hash and clear the reset-token columns in one
    /// atomic update, gated on the token still being valid.
    ///
    /// Returns `None` when the token doesn't match or has expired in the
    /// window since it was last validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn complete_reset(
        &self,
        token: &str,
        new_password_hash: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let id: Option<(i32,)> = sqlx::query_as(
            r"
            UPDATE site_user
            SET password_hash = $2,
                reset_password_token = NULL,
                reset_password_expires = NULL,
                updated_at = now()
            WHERE reset_password_token = $1 AND reset_password_expires > now()
            RETURNING id
            ",
        )
        .bind(token)
        .bind(new_password_hash)
        .fetch_optional(self.pool)
        .await?;

        match id {
            Some((id,)) => self.get_by_id(UserId::new(id)).await,
            None => Ok(None),
        }
    }

    /// Toggle a store in the user's hearts set and return the updated set.
    ///
    /// Removes the store if present, adds it otherwise. The composite
    /// primary key on `user_heart` guarantees set semantics even under
    /// concurrent toggles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn toggle_heart(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Vec<StoreId>, RepositoryError> {
        let removed = sqlx::query(
            "DELETE FROM user_heart WHERE user_id = $1 AND store_id = $2",
        )
        .bind(user_id.as_i32())
        .bind(store_id.as_i32())
        .execute(self.pool)
        .await?
        .rows_affected();

        if removed == 0 {
            sqlx::query(
                r"
                INSERT INTO user_heart (user_id, store_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(user_id.as_i32())
            .bind(store_id.as_i32())
            .execute(self.pool)
            .await?;
        }

        self.hearts(user_id).await
    }

    /// The user's hearted store ids.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn hearts(&self, user_id: UserId) -> Result<Vec<StoreId>, RepositoryError> {
        let rows: Vec<(i32,)> =
            sqlx::query_as("SELECT store_id FROM user_heart WHERE user_id = $1")
                .bind(user_id.as_i32())
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| StoreId::new(id)).collect())
    }
}
