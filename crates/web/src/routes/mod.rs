//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Store listing, page 1
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Stores
//! GET  /stores                 - Store listing, page 1
//! GET  /stores/page/{page}     - Store listing, later pages
//! GET  /store/{slug}           - Store detail with reviews
//! GET  /add                    - Add store form (auth)
//! POST /add                    - Create store (auth, multipart)
//! GET  /stores/{id}/edit       - Edit store form (auth, owner)
//! POST /add/{id}               - Update store (auth, owner, multipart)
//! GET  /map                    - Map of nearby stores
//! GET  /hearts                 - Hearted stores (auth)
//!
//! # Tags and Rankings
//! GET  /tags                   - Tag cloud, all tagged stores
//! GET  /tags/{tag}             - Tag cloud filtered to one tag
//! GET  /top                    - Top-rated stores
//!
//! # Reviews
//! POST /reviews/{id}           - Add a review to store {id} (auth)
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /register               - Register page
//! POST /register               - Register action
//! GET  /logout                 - Logout action
//!
//! # Account (requires auth except the reset flow)
//! GET  /account                - Account settings
//! POST /account                - Update name and email
//! GET  /account/forgot         - Forgot password page
//! POST /account/forgot         - Send reset email
//! GET  /account/reset/{token}  - Reset password form
//! POST /account/reset/{token}  - Complete password reset
//!
//! # JSON API
//! GET  /api/search?q=          - Full-text store search
//! GET  /api/stores/near?lng=&lat= - Stores near a point
//! POST /api/stores/{id}/heart  - Toggle a heart (auth)
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod reviews;
pub mod stores;
pub mod tags;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::index))
        .route("/stores", get(stores::index))
        .route("/stores/page/{page}", get(stores::paged))
        .route("/store/{slug}", get(stores::show))
        .route("/add", get(stores::add_page).post(stores::create))
        .route("/add/{id}", post(stores::update))
        .route("/stores/{id}/edit", get(stores::edit_page))
        .route("/map", get(stores::map_page))
        .route("/hearts", get(stores::hearts_page))
}

/// Create the tag and ranking routes router.
pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(tags::index))
        .route("/tags/{tag}", get(tags::show))
        .route("/top", get(tags::top))
}

/// Create the auth and account routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/account", get(account::index).post(account::update))
        .route(
            "/account/forgot",
            get(account::forgot_page).post(account::forgot),
        )
        .route(
            "/account/reset/{token}",
            get(account::reset_page).post(account::reset),
        )
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(api::search))
        .route("/stores/near", get(api::near))
        .route("/stores/{id}/heart", post(api::heart))
}

/// Create all routes for the application.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(store_routes())
        .merge(tag_routes())
        .route("/reviews/{id}", post(reviews::create))
        .merge(auth_routes())
        .nest("/api", api_routes())
}
