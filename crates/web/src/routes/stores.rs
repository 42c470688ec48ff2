//! Store listing, creation, and editing route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use localspot_core::StoreId;

use crate::db::stores::{PAGE_SIZE, StoreRepository};
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, OptionalAuth, RequireAuth, set_flash, take_flash};
use crate::models::{CurrentUser, Store, StoreDetail, StoreInput};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Paginated store listing.
#[derive(Template, WebTemplate)]
#[template(path = "store_list.html")]
pub struct StoreListTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub title: String,
    pub stores: Vec<Store>,
    pub hearts: Vec<StoreId>,
    pub page: i64,
    pub pages: i64,
    pub count: i64,
}

impl StoreListTemplate {
    /// Whether the viewer has hearted `id`; drives the heart button state.
    fn is_hearted(&self, id: &StoreId) -> bool {
        self.hearts.contains(id)
    }
}

/// Add/edit store form. `store` is `None` when adding.
#[derive(Template, WebTemplate)]
#[template(path = "store_form.html")]
pub struct StoreFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub title: String,
    pub store: Option<Store>,
}

/// Store detail page with reviews.
#[derive(Template, WebTemplate)]
#[template(path = "store_detail.html")]
pub struct StoreDetailTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub detail: StoreDetail,
}

/// Map page backed by `/api/stores/near`.
#[derive(Template, WebTemplate)]
#[template(path = "map.html")]
pub struct MapTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
}

/// The logged-in user's hearted stores.
#[derive(Template, WebTemplate)]
#[template(path = "hearts.html")]
pub struct HeartsTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub stores: Vec<Store>,
    pub hearts: Vec<StoreId>,
}

impl HeartsTemplate {
    fn is_hearted(&self, id: &StoreId) -> bool {
        self.hearts.contains(id)
    }
}

// =============================================================================
// Multipart Form Parsing
// =============================================================================

/// Parse the store form out of a multipart body.
///
/// Text fields map straight onto [`StoreInput`]; a `tags` field may repeat.
/// A photo part is stored through the photo service and only its generated
/// filename kept, so a form without a file leaves any existing photo alone.
async fn parse_store_form(state: &AppState, mut multipart: Multipart) -> Result<StoreInput> {
    let mut input = StoreInput::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        match name.as_str() {
            "name" => input.name = field.text().await?,
            "description" => input.description = field.text().await?,
            "address" => input.address = field.text().await?,
            "lng" => input.lng = parse_coord(&field.text().await?),
            "lat" => input.lat = parse_coord(&field.text().await?),
            "tags" => {
                let tag = field.text().await?;
                if !tag.trim().is_empty() {
                    input.tags.push(tag);
                }
            }
            "photo" => {
                // An empty file input still submits a part with no filename
                if field.file_name().is_none_or(str::is_empty) {
                    continue;
                }
                let content_type = field
                    .content_type()
                    .map(ToOwned::to_owned)
                    .unwrap_or_default();
                let data = field.bytes().await?;
                if data.is_empty() {
                    continue;
                }
                let filename = state.photos().store(&content_type, data.to_vec()).await?;
                input.photo = Some(filename);
            }
            _ => {}
        }
    }

    Ok(input)
}

fn parse_coord(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

// =============================================================================
// Listing Routes
// =============================================================================

/// Display page 1 of the store listing (home page).
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Response> {
    render_page(&state, user, &session, 1).await
}

/// Display a specific page of the store listing.
pub async fn paged(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(page): Path<i64>,
) -> Result<Response> {
    render_page(&state, user, &session, page.max(1)).await
}

async fn render_page(
    state: &AppState,
    user: Option<CurrentUser>,
    session: &Session,
    page: i64,
) -> Result<Response> {
    let repo = StoreRepository::new(state.pool());
    let (stores, count) = repo.list_page(page).await?;
    let pages = (count + PAGE_SIZE - 1) / PAGE_SIZE;

    // Requests past the end land on the last page instead of an empty one
    if stores.is_empty() && count > 0 {
        set_flash(
            session,
            Flash::info(format!(
                "You asked for page {page}, but that doesn't exist, so here is page {pages}"
            )),
        )
        .await?;
        return Ok(Redirect::to(&format!("/stores/page/{pages}")).into_response());
    }

    let hearts = match &user {
        Some(u) => UserRepository::new(state.pool()).hearts(u.id).await?,
        None => Vec::new(),
    };

    Ok(StoreListTemplate {
        current_user: user,
        flash: take_flash(session).await?,
        title: "Stores".to_string(),
        stores,
        hearts,
        page,
        pages,
        count,
    }
    .into_response())
}

/// Display a single store by slug, with its reviews.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Response> {
    let detail = StoreRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(slug))?;

    Ok(StoreDetailTemplate {
        current_user: user,
        flash: take_flash(&session).await?,
        detail,
    }
    .into_response())
}

// =============================================================================
// Add / Edit Routes
// =============================================================================

/// Display the add-store form.
pub async fn add_page(RequireAuth(user): RequireAuth, session: Session) -> Result<Response> {
    Ok(StoreFormTemplate {
        current_user: Some(user),
        flash: take_flash(&session).await?,
        title: "Add Store".to_string(),
        store: None,
    }
    .into_response())
}

/// Handle add-store form submission.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let input = parse_store_form(&state, multipart).await?;
    let store = StoreRepository::new(state.pool())
        .create(&input, user.id)
        .await?;

    set_flash(
        &session,
        Flash::success(format!(
            "Successfully created {}. Care to leave a review?",
            store.name
        )),
    )
    .await?;

    Ok(Redirect::to(&format!("/store/{}", store.slug)).into_response())
}

/// Display the edit form for a store the user owns.
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response> {
    let id = StoreId::new(id);
    let repo = StoreRepository::new(state.pool());
    repo.confirm_owner(id, user.id).await?;
    let store = repo.get_by_id(id).await?.ok_or(AppError::Database(
        crate::db::RepositoryError::NotFound,
    ))?;

    Ok(StoreFormTemplate {
        current_user: Some(user),
        flash: take_flash(&session).await?,
        title: format!("Edit {}", store.name),
        store: Some(store),
    }
    .into_response())
}

/// Handle edit-store form submission. Only the author may update.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response> {
    let input = parse_store_form(&state, multipart).await?;
    let store = StoreRepository::new(state.pool())
        .update(StoreId::new(id), &input, user.id)
        .await?;

    set_flash(
        &session,
        Flash::success(format!("Successfully updated {}", store.name)),
    )
    .await?;

    Ok(Redirect::to(&format!("/store/{}", store.slug)).into_response())
}

// =============================================================================
// Map and Hearts
// =============================================================================

/// Display the map page. Markers are loaded client-side from the near API.
pub async fn map_page(OptionalAuth(user): OptionalAuth, session: Session) -> Result<Response> {
    Ok(MapTemplate {
        current_user: user,
        flash: take_flash(&session).await?,
    }
    .into_response())
}

/// Display the logged-in user's hearted stores.
pub async fn hearts_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Response> {
    let stores = StoreRepository::new(state.pool())
        .hearted_by(user.id)
        .await?;
    let hearts = stores.iter().map(|s| s.id).collect();

    Ok(HeartsTemplate {
        current_user: Some(user),
        flash: take_flash(&session).await?,
        stores,
        hearts,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coord() {
        assert_eq!(parse_coord("-122.4"), Some(-122.4));
        assert_eq!(parse_coord(" 47.61 "), Some(47.61));
        assert_eq!(parse_coord(""), None);
        assert_eq!(parse_coord("north"), None);
    }
}
