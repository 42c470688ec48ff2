//! Integration tests for store creation, slugs, and ownership.
//!
//! These tests require a migrated `PostgreSQL` database; see the crate
//! docs for setup. Each test creates its own user and uniquely named
//! stores so runs don't interfere.

use localspot_integration_tests::{create_test_user, test_pool, test_store_input, unique_name};
use localspot_web::db::RepositoryError;
use localspot_web::db::stores::StoreRepository;

// ============================================================================
// Slug Derivation
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_slug_collision_gets_numeric_suffix() {
    let pool = test_pool().await;
    let author = create_test_user(&pool).await;
    let repo = StoreRepository::new(&pool);

    let name = unique_name("Slug Collision Cafe");
    let first = repo.create(&test_store_input(&name), author).await.unwrap();
    let second = repo.create(&test_store_input(&name), author).await.unwrap();
    let third = repo.create(&test_store_input(&name), author).await.unwrap();

    assert_eq!(second.slug, format!("{}-2", first.slug));
    assert_eq!(third.slug, format!("{}-3", first.slug));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_slug_is_stable_across_rename() {
    let pool = test_pool().await;
    let author = create_test_user(&pool).await;
    let repo = StoreRepository::new(&pool);

    let store = repo
        .create(&test_store_input(&unique_name("Rename Me")), author)
        .await
        .unwrap();

    let mut input = test_store_input(&unique_name("Completely Different"));
    input.description = "renamed".to_owned();
    let updated = repo.update(store.id, &input, author).await.unwrap();

    assert_eq!(updated.slug, store.slug);
    assert_ne!(updated.name, store.name);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_get_by_slug_populates_author_and_reviews() {
    let pool = test_pool().await;
    let author = create_test_user(&pool).await;
    let repo = StoreRepository::new(&pool);

    let store = repo
        .create(&test_store_input(&unique_name("Detail Store")), author)
        .await
        .unwrap();

    let detail = repo.get_by_slug(&store.slug).await.unwrap().unwrap();
    assert_eq!(detail.store.id, store.id);
    assert_eq!(detail.author_name, "Test User");
    assert!(detail.reviews.is_empty());
    assert!(detail.average_rating().is_none());
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_non_owner_cannot_update() {
    let pool = test_pool().await;
    let author = create_test_user(&pool).await;
    let stranger = create_test_user(&pool).await;
    let repo = StoreRepository::new(&pool);

    let store = repo
        .create(&test_store_input(&unique_name("Owned Store")), author)
        .await
        .unwrap();

    let result = repo
        .update(store.id, &test_store_input("Hijacked"), stranger)
        .await;
    assert!(matches!(result, Err(RepositoryError::Forbidden(_))));

    // The row is untouched
    let unchanged = repo.get_by_id(store.id).await.unwrap().unwrap();
    assert_eq!(unchanged.name, store.name);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_create_rejects_missing_fields() {
    let pool = test_pool().await;
    let author = create_test_user(&pool).await;
    let repo = StoreRepository::new(&pool);

    let mut input = test_store_input(&unique_name("Incomplete"));
    input.address = String::new();
    assert!(matches!(
        repo.create(&input, author).await,
        Err(RepositoryError::Validation(_))
    ));

    let mut input = test_store_input(&unique_name("Incomplete"));
    input.lng = None;
    assert!(matches!(
        repo.create(&input, author).await,
        Err(RepositoryError::Validation(_))
    ));
}
