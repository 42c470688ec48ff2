//! One-shot flash messages stored in the session.
//!
//! A flash survives exactly one redirect: the posting handler sets it, the
//! handler rendering the next page takes it, and taking removes it from the
//! session.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Flash message severity, mapped to a CSS class in templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    /// CSS class suffix used by the flash partial.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A flash message queued for the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }
}

/// Queue a flash message for the next page load.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(
    session: &Session,
    flash: Flash,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Take the pending flash message, removing it from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn take_flash(
    session: &Session,
) -> Result<Option<Flash>, tower_sessions::session::Error> {
    session.remove::<Flash>(session_keys::FLASH).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_kind_css_class() {
        assert_eq!(FlashKind::Success.css_class(), "success");
        assert_eq!(FlashKind::Error.css_class(), "error");
        assert_eq!(FlashKind::Info.css_class(), "info");
    }

    #[test]
    fn test_flash_constructors() {
        let flash = Flash::success("store saved");
        assert_eq!(flash.kind, FlashKind::Success);
        assert_eq!(flash.message, "store saved");

        let flash = Flash::error("nope");
        assert_eq!(flash.kind, FlashKind::Error);
    }
}
