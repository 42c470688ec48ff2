//! Review domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use localspot_core::{Rating, ReviewId, StoreId, UserId};

use crate::db::RepositoryError;

/// A review with its author populated.
///
/// Reviews are always read together with the author's display name; the
/// repository enforces referential integrity at write time so a review is
/// never orphaned.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub author_id: UserId,
    /// Display name of the reviewer.
    pub author_name: String,
    pub store_id: StoreId,
    pub rating: Rating,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new review.
///
/// The author and store ids are never taken from here; the repository fixes
/// them from the authenticated session and the URL.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub rating: i16,
    pub body: String,
}

impl ReviewInput {
    /// Validate the rating range and that the trimmed text is non-empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` describing the problem.
    pub fn validate(&self) -> Result<Rating, RepositoryError> {
        let rating = Rating::new(self.rating)
            .map_err(|e| RepositoryError::Validation(e.to_string()))?;
        if self.body.trim().is_empty() {
            return Err(RepositoryError::Validation(
                "please enter a review".to_owned(),
            ));
        }
        Ok(rating)
    }

    /// The review text with surrounding whitespace removed.
    #[must_use]
    pub fn trimmed_body(&self) -> &str {
        self.body.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rating_bounds() {
        let input = ReviewInput {
            rating: 5,
            body: "great".to_owned(),
        };
        assert!(input.validate().is_ok());

        let input = ReviewInput {
            rating: 0,
            body: "great".to_owned(),
        };
        assert!(matches!(
            input.validate(),
            Err(RepositoryError::Validation(_))
        ));

        let input = ReviewInput {
            rating: 6,
            body: "great".to_owned(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_text() {
        let input = ReviewInput {
            rating: 4,
            body: "   ".to_owned(),
        };
        assert!(matches!(
            input.validate(),
            Err(RepositoryError::Validation(_))
        ));
    }

    #[test]
    fn test_trimmed_body() {
        let input = ReviewInput {
            rating: 4,
            body: "  tasty  ".to_owned(),
        };
        assert_eq!(input.trimmed_body(), "tasty");
    }
}
