//! Integration tests for Localspot.
//!
//! # Running Tests
//!
//! The tests in `tests/` exercise the repositories against a real
//! `PostgreSQL` database and are `#[ignore]`d by default.
//!
//! ```bash
//! # Point at a migrated test database
//! export LOCALSPOT_TEST_DATABASE_URL=postgres://localhost/localspot_test
//! cargo run -p localspot-cli -- migrate
//!
//! # Run the ignored tests
//! cargo test -p localspot-integration-tests -- --ignored
//! ```
//!
//! The HTTP smoke tests additionally need a running server and read
//! `LOCALSPOT_BASE_URL` (default `http://localhost:7777`).

use secrecy::SecretString;
use sqlx::PgPool;

use localspot_web::db::create_pool;
use localspot_web::models::StoreInput;
use localspot_web::services::auth::AuthService;

/// Connect to the test database named by `LOCALSPOT_TEST_DATABASE_URL`,
/// falling back to `DATABASE_URL`.
///
/// # Panics
///
/// Panics if neither variable is set or the database is unreachable; the
/// tests using it are `#[ignore]`d so this never fires in a plain
/// `cargo test`.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("LOCALSPOT_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("set LOCALSPOT_TEST_DATABASE_URL to run integration tests");

    create_pool(&SecretString::from(url))
        .await
        .expect("failed to connect to the test database")
}

/// Register a throwaway user with a unique email, returning their id.
pub async fn create_test_user(pool: &PgPool) -> localspot_core::UserId {
    let email = format!("test-{}@localspot.test", uuid::Uuid::new_v4());
    let user = AuthService::new(pool)
        .register(&email, "Test User", "integration-password")
        .await
        .expect("failed to register test user");
    user.id
}

/// A valid store input with a unique name.
#[must_use]
pub fn test_store_input(name: &str) -> StoreInput {
    StoreInput {
        name: name.to_owned(),
        description: "A place that exists only in tests.".to_owned(),
        tags: Vec::new(),
        address: "1 Test Way".to_owned(),
        lng: Some(-122.33),
        lat: Some(47.61),
        photo: None,
    }
}

/// A unique store name for a test run.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", uuid::Uuid::new_v4())
}
