//! Integration tests for the password-reset token lifecycle.

use chrono::{Duration, Utc};
use localspot_integration_tests::test_pool;
use localspot_web::db::users::UserRepository;
use localspot_web::services::auth::{AuthError, AuthService};

async fn register_user(auth: &AuthService<'_>) -> String {
    let email = format!("reset-{}@localspot.test", uuid::Uuid::new_v4());
    auth.register(&email, "Reset Tester", "original-password")
        .await
        .expect("failed to register test user");
    email
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_reset_round_trip_changes_password() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);
    let email = register_user(&auth).await;

    let (user, token) = auth.request_reset(&email).await.unwrap();
    assert_eq!(auth.validate_reset_token(&token).await.unwrap(), user.id);

    let reset_user = auth
        .complete_reset(&token, "brand-new-password", "brand-new-password")
        .await
        .unwrap();
    assert_eq!(reset_user.id, user.id);

    // Old password no longer works, new one does
    assert!(matches!(
        auth.login(&email, "original-password").await,
        Err(AuthError::InvalidCredentials)
    ));
    auth.login(&email, "brand-new-password").await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_token_is_single_use() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);
    let email = register_user(&auth).await;

    let (_, token) = auth.request_reset(&email).await.unwrap();
    auth.complete_reset(&token, "brand-new-password", "brand-new-password")
        .await
        .unwrap();

    // Completing the reset cleared the token
    assert!(matches!(
        auth.validate_reset_token(&token).await,
        Err(AuthError::InvalidResetToken)
    ));
    assert!(matches!(
        auth.complete_reset(&token, "another-password", "another-password")
            .await,
        Err(AuthError::InvalidResetToken)
    ));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_new_request_replaces_pending_token() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);
    let email = register_user(&auth).await;

    let (_, first) = auth.request_reset(&email).await.unwrap();
    let (_, second) = auth.request_reset(&email).await.unwrap();

    assert!(matches!(
        auth.validate_reset_token(&first).await,
        Err(AuthError::InvalidResetToken)
    ));
    auth.validate_reset_token(&second).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_expired_token_is_rejected() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);
    let email = register_user(&auth).await;

    let (user, token) = auth.request_reset(&email).await.unwrap();

    // Backdate the expiry past the cutoff
    UserRepository::new(&pool)
        .set_reset_token(user.id, &token, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    assert!(matches!(
        auth.validate_reset_token(&token).await,
        Err(AuthError::InvalidResetToken)
    ));
    assert!(matches!(
        auth.complete_reset(&token, "brand-new-password", "brand-new-password")
            .await,
        Err(AuthError::InvalidResetToken)
    ));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_unknown_email_yields_user_not_found() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    let result = auth
        .request_reset(&format!("nobody-{}@localspot.test", uuid::Uuid::new_v4()))
        .await;
    assert!(matches!(result, Err(AuthError::UserNotFound)));
}
