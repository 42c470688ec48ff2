//! Session-related types.
//!
//! Types stored in the session for authentication state. The session holds
//! only the serialized identity; the full user record is rehydrated from the
//! database on each request that needs it.

use serde::{Deserialize, Serialize};

use localspot_core::{Email, UserId};

/// Session-stored user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name, shown in the nav.
    pub name: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the one-shot flash message.
    pub const FLASH: &str = "flash";
}
