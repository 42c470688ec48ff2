//! User domain types.

use chrono::{DateTime, Utc};

use localspot_core::{Email, StoreId, UserId};

/// A registered user (domain type).
///
/// The credential hash and reset-token columns never leave the repository
/// layer; this type is what handlers and templates see.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// The user's hearted stores.
    pub hearts: Vec<StoreId>,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
