//! Store domain types and slug derivation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use localspot_core::{StoreId, UserId};

use crate::db::RepositoryError;
use crate::models::review::Review;

/// A geographic point with its human-readable address.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    /// Longitude in degrees.
    pub lng: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Street address shown on the store page.
    pub address: String,
}

/// A store as persisted (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Display name.
    pub name: String,
    /// URL-safe unique identifier derived from the name.
    pub slug: String,
    /// Free-form description.
    pub description: String,
    /// Deduplicated tag set.
    pub tags: Vec<String>,
    /// Where the store is.
    pub location: Location,
    /// Uploaded photo filename, if any.
    pub photo: Option<String>,
    /// Owning user.
    pub author_id: UserId,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Whether the store carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A store together with its populated relations.
///
/// Every store fetch by slug carries its author and reviews; the average
/// rating is derived here rather than stored.
#[derive(Debug, Clone)]
pub struct StoreDetail {
    /// The store itself.
    pub store: Store,
    /// Display name of the owning user.
    pub author_name: String,
    /// All reviews for this store, newest first, authors populated.
    pub reviews: Vec<Review>,
}

impl StoreDetail {
    /// Mean of the review ratings, `None` when there are no reviews.
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let sum: f64 = self.reviews.iter().map(|r| f64::from(r.rating.as_i16())).sum();
        #[allow(clippy::cast_precision_loss)] // review counts are small
        Some(sum / self.reviews.len() as f64)
    }
}

/// Caller-supplied fields for creating or updating a store.
#[derive(Debug, Clone, Default)]
pub struct StoreInput {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub address: String,
    pub lng: Option<f64>,
    pub lat: Option<f64>,
    /// Set when a new photo was uploaded alongside the form.
    pub photo: Option<String>,
}

impl StoreInput {
    /// Check the required fields are present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` naming the first missing field.
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.name.trim().is_empty() {
            return Err(RepositoryError::Validation(
                "please enter a store name".to_owned(),
            ));
        }
        if self.address.trim().is_empty() {
            return Err(RepositoryError::Validation(
                "you must supply an address".to_owned(),
            ));
        }
        if self.lng.is_none() || self.lat.is_none() {
            return Err(RepositoryError::Validation(
                "you must supply coordinates".to_owned(),
            ));
        }
        Ok(())
    }

    /// Tags with duplicates and empty entries removed, order preserved.
    #[must_use]
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for tag in &self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !seen.iter().any(|s: &String| s == tag) {
                seen.push(tag.to_owned());
            }
        }
        seen
    }
}

/// One tag with its occurrence count across all stores.
#[derive(Debug, Clone, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

/// A store in the top-rated listing.
#[derive(Debug, Clone, Serialize)]
pub struct TopStore {
    pub slug: String,
    pub name: String,
    pub photo: Option<String>,
    /// Mean of the store's review ratings.
    pub average_rating: f64,
    pub review_count: i64,
}

/// A full-text search hit, ranked by text score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub photo: Option<String>,
    /// Relevance ranking from the text index.
    pub score: f32,
}

/// The slim projection returned by the map proximity query.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyStore {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub photo: Option<String>,
}

/// Derive a URL-safe slug from a store name.
///
/// Lowercases the name and collapses every run of non-alphanumeric
/// characters into a single hyphen. The output is never empty and only
/// ever contains `[a-z0-9-]`, which the collision query in the store
/// repository relies on (no regex escaping needed). A name with no
/// ASCII alphanumerics at all falls back to `"store"` so the detail
/// URL stays routable.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("store");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Coffee Corner"), "coffee-corner");
        assert_eq!(slugify("Mike's Bikes"), "mike-s-bikes");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  A  --  B  "), "a-b");
        assert_eq!(slugify("!!wow!!"), "wow");
    }

    #[test]
    fn test_slugify_strips_non_ascii() {
        assert_eq!(slugify("Café 9"), "caf-9");
    }

    #[test]
    fn test_slugify_falls_back_for_unsluggable_names() {
        // Names with no ASCII alphanumerics still need a routable slug
        assert_eq!(slugify("日本語"), "store");
        assert_eq!(slugify("!!!"), "store");
        assert_eq!(slugify(""), "store");
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut input = StoreInput {
            name: "A Store".to_owned(),
            address: "1 Main St".to_owned(),
            lng: Some(-122.4),
            lat: Some(37.7),
            ..StoreInput::default()
        };
        assert!(input.validate().is_ok());

        input.lat = None;
        assert!(matches!(
            input.validate(),
            Err(RepositoryError::Validation(_))
        ));

        input.lat = Some(37.7);
        input.address = "  ".to_owned();
        assert!(matches!(
            input.validate(),
            Err(RepositoryError::Validation(_))
        ));

        input.address = "1 Main St".to_owned();
        input.name = String::new();
        assert!(matches!(
            input.validate(),
            Err(RepositoryError::Validation(_))
        ));
    }

    #[test]
    fn test_normalized_tags_dedupes() {
        let input = StoreInput {
            tags: vec![
                "wifi".to_owned(),
                "cafe".to_owned(),
                " wifi ".to_owned(),
                String::new(),
            ],
            ..StoreInput::default()
        };
        assert_eq!(input.normalized_tags(), vec!["wifi", "cafe"]);
    }

    #[test]
    fn test_average_rating_derived() {
        use chrono::Utc;
        use localspot_core::{Rating, ReviewId, StoreId, UserId};

        let review = |rating: i16| Review {
            id: ReviewId::new(1),
            author_id: UserId::new(1),
            author_name: "a".to_owned(),
            store_id: StoreId::new(1),
            rating: Rating::new(rating).expect("valid rating"),
            body: "fine".to_owned(),
            created_at: Utc::now(),
        };

        let mut detail = StoreDetail {
            store: Store {
                id: StoreId::new(1),
                name: "s".to_owned(),
                slug: "s".to_owned(),
                description: String::new(),
                tags: vec![],
                location: Location {
                    lng: 0.0,
                    lat: 0.0,
                    address: "x".to_owned(),
                },
                photo: None,
                author_id: UserId::new(1),
                created_at: Utc::now(),
            },
            author_name: "a".to_owned(),
            reviews: vec![],
        };

        assert_eq!(detail.average_rating(), None);

        detail.reviews = vec![review(3), review(4), review(5)];
        assert_eq!(detail.average_rating(), Some(4.0));
    }
}
