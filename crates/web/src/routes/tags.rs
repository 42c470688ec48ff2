//! Tag listing route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::db::stores::StoreRepository;
use crate::db::users::UserRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, OptionalAuth, take_flash};
use crate::models::{CurrentUser, Store, TagCount, TopStore};
use crate::state::AppState;
use localspot_core::StoreId;

/// Tag cloud plus the stores carrying the active tag.
#[derive(Template, WebTemplate)]
#[template(path = "tags.html")]
pub struct TagsTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub tags: Vec<TagCount>,
    /// The tag being filtered on, if any.
    pub active_tag: Option<String>,
    pub stores: Vec<Store>,
    pub hearts: Vec<StoreId>,
}

impl TagsTemplate {
    fn is_hearted(&self, id: &StoreId) -> bool {
        self.hearts.contains(id)
    }

    /// Whether `tag` is the one currently filtered on.
    fn is_active(&self, tag: &str) -> bool {
        self.active_tag.as_deref() == Some(tag)
    }
}

/// Top-rated stores leaderboard.
#[derive(Template, WebTemplate)]
#[template(path = "top.html")]
pub struct TopTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub stores: Vec<TopStore>,
}

/// Display every tag with its count; with no tag selected the store list
/// shows all tagged stores.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Response> {
    render_tags(&state, user, &session, None).await
}

/// Display the tag cloud filtered to a single tag.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(tag): Path<String>,
) -> Result<Response> {
    render_tags(&state, user, &session, Some(tag)).await
}

async fn render_tags(
    state: &AppState,
    user: Option<CurrentUser>,
    session: &Session,
    active_tag: Option<String>,
) -> Result<Response> {
    let repo = StoreRepository::new(state.pool());

    // Both queries are independent; run them concurrently
    let (tags, stores) = tokio::try_join!(
        repo.tags_list(),
        repo.list_by_tag(active_tag.as_deref())
    )?;

    let hearts = match &user {
        Some(u) => UserRepository::new(state.pool()).hearts(u.id).await?,
        None => Vec::new(),
    };

    Ok(TagsTemplate {
        current_user: user,
        flash: take_flash(session).await?,
        tags,
        active_tag,
        stores,
        hearts,
    }
    .into_response())
}

/// Display the top-rated stores (two or more reviews, best average first).
pub async fn top(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Response> {
    let stores = StoreRepository::new(state.pool()).top_stores().await?;

    Ok(TopTemplate {
        current_user: user,
        flash: take_flash(&session).await?,
        stores,
    }
    .into_response())
}
