//! JSON API route handlers.
//!
//! Backs the client-side pieces of the site: the typeahead search box,
//! the map markers, and the heart buttons.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use localspot_core::StoreId;

use crate::db::stores::{DEFAULT_NEAR_METERS, StoreRepository};
use crate::db::users::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{NearbyStore, SearchHit};
use crate::state::AppState;

/// Query parameters for `/api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Query parameters for `/api/stores/near`.
#[derive(Debug, Deserialize)]
pub struct NearQuery {
    pub lng: f64,
    pub lat: f64,
    /// Search radius in meters. Defaults to 10km.
    pub max_distance: Option<f64>,
}

/// Full-text store search, best matches first.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>> {
    let q = query.q.unwrap_or_default();
    if q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    let hits = StoreRepository::new(state.pool()).search(&q).await?;
    Ok(Json(hits))
}

/// Stores near a point, closest first.
pub async fn near(
    State(state): State<AppState>,
    Query(query): Query<NearQuery>,
) -> Result<Json<Vec<NearbyStore>>> {
    let max = query.max_distance.unwrap_or(DEFAULT_NEAR_METERS);
    let stores = StoreRepository::new(state.pool())
        .near(query.lng, query.lat, max)
        .await?;
    Ok(Json(stores))
}

/// Toggle a heart on a store; responds with the full hearted set so the
/// client can re-render every heart button.
pub async fn heart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(store_id): Path<i32>,
) -> Result<Json<Vec<StoreId>>> {
    let hearts = UserRepository::new(state.pool())
        .toggle_heart(user.id, StoreId::new(store_id))
        .await?;
    Ok(Json(hearts))
}
