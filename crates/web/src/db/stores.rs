//! Store repository: slug derivation, relation population, and the
//! aggregation queries behind the tag, top-store, search, and map pages.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use localspot_core::{StoreId, UserId};

use super::reviews::ReviewRepository;
use super::{RepositoryError, map_unique_violation};
use crate::models::store::slugify;
use crate::models::{
    Location, NearbyStore, SearchHit, Store, StoreDetail, StoreInput, TagCount, TopStore,
};

/// Default page size for the store listing.
pub const PAGE_SIZE: i64 = 4;

/// Default radius for the proximity query, in meters (10 km).
pub const DEFAULT_NEAR_METERS: f64 = 10_000.0;

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    tags: Vec<String>,
    address: String,
    lng: f64,
    lat: f64,
    photo: Option<String>,
    author_id: i32,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: StoreId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            tags: row.tags,
            location: Location {
                lng: row.lng,
                lat: row.lat,
                address: row.address,
            },
            photo: row.photo,
            author_id: UserId::new(row.author_id),
            created_at: row.created_at,
        }
    }
}

/// Column list matching [`StoreRow`].
const STORE_COLUMNS: &str =
    "id, name, slug, description, tags, address, lng, lat, photo, author_id, created_at";

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a store owned by `author_id`, deriving a unique slug from
    /// the name.
    ///
    /// If the derived slug collides with an existing `slug` or `slug-<n>`,
    /// a `-<count + 1>` suffix is appended.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if name, address, or
    /// coordinates are missing, and `RepositoryError::Conflict` if two
    /// concurrent creates race to the same slug.
    pub async fn create(
        &self,
        input: &StoreInput,
        author_id: UserId,
    ) -> Result<Store, RepositoryError> {
        input.validate()?;
        let slug = self.unique_slug(&input.name).await?;

        let sql = format!(
            r"
            INSERT INTO store (name, slug, description, tags, address, lng, lat, photo, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {STORE_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(input.name.trim())
            .bind(&slug)
            .bind(input.description.trim())
            .bind(input.normalized_tags())
            .bind(input.address.trim())
            .bind(input.lng)
            .bind(input.lat)
            .bind(&input.photo)
            .bind(author_id.as_i32())
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "a store with this slug already exists"))?;

        Ok(row.into())
    }

    /// Update a store's editable fields. The slug is stable across renames
    /// and the author may not be reassigned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Forbidden` when `editor_id` is not the
    /// store's author, `RepositoryError::NotFound` when the store doesn't
    /// exist, and `RepositoryError::Validation` on bad input. Nothing is
    /// written in any of those cases.
    pub async fn update(
        &self,
        id: StoreId,
        input: &StoreInput,
        editor_id: UserId,
    ) -> Result<Store, RepositoryError> {
        input.validate()?;
        self.confirm_owner(id, editor_id).await?;

        let sql = format!(
            r"
            UPDATE store
            SET name = $2, description = $3, tags = $4, address = $5,
                lng = $6, lat = $7, photo = COALESCE($8, photo)
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(id.as_i32())
            .bind(input.name.trim())
            .bind(input.description.trim())
            .bind(input.normalized_tags())
            .bind(input.address.trim())
            .bind(input.lng)
            .bind(input.lat)
            .bind(&input.photo)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Fail with `Forbidden` unless `editor_id` owns the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    pub async fn confirm_owner(
        &self,
        id: StoreId,
        editor_id: UserId,
    ) -> Result<(), RepositoryError> {
        let author: Option<(i32,)> =
            sqlx::query_as("SELECT author_id FROM store WHERE id = $1")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        let (author_id,) = author.ok_or(RepositoryError::NotFound)?;
        if author_id != editor_id.as_i32() {
            return Err(RepositoryError::Forbidden(
                "you must own a store in order to edit it".to_owned(),
            ));
        }
        Ok(())
    }

    /// Get a store by ID (used by the edit form).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM store WHERE id = $1");
        let row = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Get a store by slug with author and reviews populated.
    ///
    /// Population here is repository policy, not a caller option: the
    /// detail page, and anything else reading a store by slug, always sees
    /// the linked author and the full review list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<StoreDetail>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct DetailRow {
            #[sqlx(flatten)]
            store: StoreRow,
            author_name: String,
        }

        let sql = format!(
            r"
            SELECT s.{}, u.name AS author_name
            FROM store s
            JOIN site_user u ON u.id = s.author_id
            WHERE s.slug = $1
            ",
            STORE_COLUMNS.replace(", ", ", s.")
        );
        let row = sqlx::query_as::<_, DetailRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let store: Store = row.store.into();
        let reviews = ReviewRepository::new(self.pool).for_store(store.id).await?;

        Ok(Some(StoreDetail {
            store,
            author_name: row.author_name,
            reviews,
        }))
    }

    /// A page of stores, newest first, plus the total count.
    ///
    /// Pages are 1-based and [`PAGE_SIZE`] long. Callers are expected to
    /// redirect past-the-end requests to the last valid page,
    /// `ceil(count / PAGE_SIZE)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_page(&self, page: i64) -> Result<(Vec<Store>, i64), RepositoryError> {
        let page = page.max(1);
        let sql = format!(
            "SELECT {STORE_COLUMNS} FROM store ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(PAGE_SIZE)
            .bind((page - 1) * PAGE_SIZE)
            .fetch_all(self.pool)
            .await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM store")
            .fetch_one(self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), count))
    }

    /// Stores carrying `tag`, or every tagged store when `tag` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_tag(&self, tag: Option<&str>) -> Result<Vec<Store>, RepositoryError> {
        let rows = match tag {
            Some(tag) => {
                let sql = format!(
                    "SELECT {STORE_COLUMNS} FROM store WHERE $1 = ANY(tags) ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, StoreRow>(&sql)
                    .bind(tag)
                    .fetch_all(self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {STORE_COLUMNS} FROM store WHERE cardinality(tags) > 0 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, StoreRow>(&sql)
                    .fetch_all(self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Distinct tags with occurrence counts, most used first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tags_list(&self) -> Result<Vec<TagCount>, RepositoryError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r"
            SELECT t.tag, COUNT(*) AS count
            FROM store, LATERAL unnest(store.tags) AS t(tag)
            GROUP BY t.tag
            ORDER BY count DESC, t.tag ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect())
    }

    /// The ten best stores by mean review rating, counting only stores
    /// with at least two reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_stores(&self) -> Result<Vec<TopStore>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct TopRow {
            slug: String,
            name: String,
            photo: Option<String>,
            average_rating: f64,
            review_count: i64,
        }

        let rows: Vec<TopRow> = sqlx::query_as(
            r"
            SELECT s.slug, s.name, s.photo,
                   AVG(r.rating)::float8 AS average_rating,
                   COUNT(r.id) AS review_count
            FROM store s
            JOIN review r ON r.store_id = s.id
            GROUP BY s.id
            HAVING COUNT(r.id) >= 2
            ORDER BY average_rating DESC
            LIMIT 10
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TopStore {
                slug: r.slug,
                name: r.name,
                photo: r.photo,
                average_rating: r.average_rating,
                review_count: r.review_count,
            })
            .collect())
    }

    /// Full-text search over name and description, ranked by text score,
    /// limited to 5 results.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct HitRow {
            slug: String,
            name: String,
            description: String,
            photo: Option<String>,
            score: f32,
        }

        let rows: Vec<HitRow> = sqlx::query_as(
            r"
            SELECT slug, name, description, photo,
                   ts_rank(to_tsvector('english', name || ' ' || description),
                           plainto_tsquery('english', $1)) AS score
            FROM store
            WHERE to_tsvector('english', name || ' ' || description)
                  @@ plainto_tsquery('english', $1)
            ORDER BY score DESC
            LIMIT 5
            ",
        )
        .bind(query)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SearchHit {
                slug: r.slug,
                name: r.name,
                description: r.description,
                photo: r.photo,
                score: r.score,
            })
            .collect())
    }

    /// Stores within `max_meters` of the point, nearest first, at most 10,
    /// projecting only the fields the map needs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn near(
        &self,
        lng: f64,
        lat: f64,
        max_meters: f64,
    ) -> Result<Vec<NearbyStore>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct NearRow {
            slug: String,
            name: String,
            description: String,
            address: String,
            lng: f64,
            lat: f64,
            photo: Option<String>,
        }

        // earth_box prunes via the GiST index; earth_distance exactifies.
        let rows: Vec<NearRow> = sqlx::query_as(
            r"
            SELECT slug, name, description, address, lng, lat, photo
            FROM store
            WHERE earth_box(ll_to_earth($2, $1), $3) @> ll_to_earth(lat, lng)
              AND earth_distance(ll_to_earth($2, $1), ll_to_earth(lat, lng)) <= $3
            ORDER BY earth_distance(ll_to_earth($2, $1), ll_to_earth(lat, lng)) ASC
            LIMIT 10
            ",
        )
        .bind(lng)
        .bind(lat)
        .bind(max_meters)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| NearbyStore {
                slug: r.slug,
                name: r.name,
                description: r.description,
                location: Location {
                    lng: r.lng,
                    lat: r.lat,
                    address: r.address,
                },
                photo: r.photo,
            })
            .collect())
    }

    /// The stores a user has hearted, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn hearted_by(&self, user_id: UserId) -> Result<Vec<Store>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {STORE_COLUMNS} FROM store
            WHERE id IN (SELECT store_id FROM user_heart WHERE user_id = $1)
            ORDER BY created_at DESC
            "
        );
        let rows = sqlx::query_as::<_, StoreRow>(&sql)
            .bind(user_id.as_i32())
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Derive a slug for `name` that doesn't collide with existing slugs.
    ///
    /// Counts slugs matching `^(base)(-[0-9]*)?$` case-insensitively and
    /// appends `-<count + 1>` when any exist. `slugify` output is limited
    /// to `[a-z0-9-]`, so the base needs no regex escaping.
    async fn unique_slug(&self, name: &str) -> Result<String, RepositoryError> {
        let base = slugify(name);
        let pattern = format!("^({base})(-[0-9]*)?$");

        let (colliding,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM store WHERE slug ~* $1")
                .bind(&pattern)
                .fetch_one(self.pool)
                .await?;

        if colliding == 0 {
            Ok(base)
        } else {
            Ok(format!("{base}-{}", colliding + 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_collision_pattern_shape() {
        // The pattern must match the bare slug and numbered suffixes, and
        // nothing else (e.g., prefixed names).
        let base = slugify("Coffee Corner");
        let pattern = format!("^({base})(-[0-9]*)?$");
        assert_eq!(pattern, "^(coffee-corner)(-[0-9]*)?$");

        let re = regex_lite(&pattern);
        assert!(re("coffee-corner"));
        assert!(re("coffee-corner-2"));
        assert!(re("coffee-corner-10"));
        assert!(!re("coffee-corner-two"));
        assert!(!re("the-coffee-corner"));
    }

    /// Tiny checker for the exact pattern shape used above, so the test
    /// doesn't need a regex dependency.
    fn regex_lite(pattern: &str) -> impl Fn(&str) -> bool + '_ {
        let base = pattern
            .trim_start_matches("^(")
            .split(')')
            .next()
            .unwrap_or_default();
        move |candidate: &str| {
            candidate.strip_prefix(base).is_some_and(|rest| {
                rest.is_empty()
                    || rest
                        .strip_prefix('-')
                        .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
            })
        }
    }
}
