//! Review route handlers.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use localspot_core::StoreId;

use crate::db::reviews::ReviewRepository;
use crate::db::stores::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::{Flash, RequireAuth, set_flash};
use crate::models::ReviewInput;
use crate::state::AppState;

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: i16,
    pub body: String,
}

/// Handle review submission for a store.
///
/// The author comes from the session and the store from the path; nothing
/// else in the form can bind them elsewhere.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(store_id): Path<i32>,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    let store_id = StoreId::new(store_id);
    let input = ReviewInput {
        rating: form.rating,
        body: form.body,
    };

    ReviewRepository::new(state.pool())
        .add(user.id, store_id, &input)
        .await?;

    set_flash(&session, Flash::success("Review saved!")).await?;

    // Land back on the store page the review belongs to
    let store = StoreRepository::new(state.pool())
        .get_by_id(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {}", store_id.as_i32())))?;

    Ok(Redirect::to(&format!("/store/{}", store.slug)).into_response())
}
