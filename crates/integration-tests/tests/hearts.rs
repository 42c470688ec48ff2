//! Integration tests for the hearts (favorites) set.

use localspot_integration_tests::{create_test_user, test_pool, test_store_input, unique_name};
use localspot_web::db::stores::StoreRepository;
use localspot_web::db::users::UserRepository;

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_toggle_heart_adds_then_removes() {
    let pool = test_pool().await;
    let user = create_test_user(&pool).await;
    let store = StoreRepository::new(&pool)
        .create(&test_store_input(&unique_name("Heartable")), user)
        .await
        .unwrap();

    let users = UserRepository::new(&pool);
    assert!(users.hearts(user).await.unwrap().is_empty());

    let after_add = users.toggle_heart(user, store.id).await.unwrap();
    assert_eq!(after_add, vec![store.id]);

    let after_remove = users.toggle_heart(user, store.id).await.unwrap();
    assert!(after_remove.is_empty());
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_hearts_are_per_user() {
    let pool = test_pool().await;
    let alice = create_test_user(&pool).await;
    let bob = create_test_user(&pool).await;
    let store = StoreRepository::new(&pool)
        .create(&test_store_input(&unique_name("Shared Store")), alice)
        .await
        .unwrap();

    let users = UserRepository::new(&pool);
    users.toggle_heart(alice, store.id).await.unwrap();

    assert_eq!(users.hearts(alice).await.unwrap(), vec![store.id]);
    assert!(users.hearts(bob).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_hearted_by_returns_full_stores() {
    let pool = test_pool().await;
    let user = create_test_user(&pool).await;
    let stores = StoreRepository::new(&pool);
    let users = UserRepository::new(&pool);

    let first = stores
        .create(&test_store_input(&unique_name("First Pick")), user)
        .await
        .unwrap();
    let second = stores
        .create(&test_store_input(&unique_name("Second Pick")), user)
        .await
        .unwrap();

    users.toggle_heart(user, first.id).await.unwrap();
    users.toggle_heart(user, second.id).await.unwrap();

    let hearted = stores.hearted_by(user).await.unwrap();
    let ids: Vec<_> = hearted.iter().map(|s| s.id).collect();
    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));
}
