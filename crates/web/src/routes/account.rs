//! Account and password-reset route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, RequireAuth, set_current_user, set_flash, take_flash};
use crate::models::CurrentUser;
use crate::routes::auth::log_in;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Account update form data.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    pub name: String,
    pub email: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetForm {
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Account settings page.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
}

/// Forgot password page.
#[derive(Template, WebTemplate)]
#[template(path = "forgot.html")]
pub struct ForgotTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
}

/// Reset password page, reached from the emailed link.
#[derive(Template, WebTemplate)]
#[template(path = "reset.html")]
pub struct ResetTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub token: String,
}

// =============================================================================
// Account Handlers
// =============================================================================

/// Display the account settings page.
pub async fn index(RequireAuth(user): RequireAuth, session: Session) -> Result<Response> {
    Ok(AccountTemplate {
        current_user: Some(user),
        flash: take_flash(&session).await?,
    }
    .into_response())
}

/// Handle account update (name and email).
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<AccountForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    match auth.update_account(user.id, &form.name, &form.email).await {
        Ok(updated) => {
            // Keep the session identity in step with the database
            let current = CurrentUser {
                id: updated.id,
                email: updated.email.clone(),
                name: updated.name.clone(),
            };
            set_current_user(&session, &current).await?;
            set_flash(&session, Flash::success("Updated the profile!")).await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Account update failed");
            set_flash(&session, Flash::error(e.user_message())).await?;
        }
    }

    Ok(Redirect::to("/account").into_response())
}

// =============================================================================
// Password Reset Handlers
// =============================================================================

/// Display the forgot-password page.
pub async fn forgot_page(session: Session) -> Result<Response> {
    Ok(ForgotTemplate {
        current_user: None,
        flash: take_flash(&session).await?,
    }
    .into_response())
}

/// Handle the forgot-password form.
///
/// The response is identical whether or not the email is registered, so
/// the form can't be used to probe for accounts. A reset email only goes
/// out for real accounts.
pub async fn forgot(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    match auth.request_reset(&form.email).await {
        Ok((user, token)) => {
            let reset_url = state.config().reset_url(&token);
            state
                .mail()
                .send_password_reset(user.email.as_str(), &user.name, &reset_url)
                .await?;
        }
        Err(AuthError::UserNotFound | AuthError::InvalidEmail(_)) => {
            tracing::debug!("Password reset requested for unknown email");
        }
        Err(e) => return Err(e.into()),
    }

    set_flash(
        &session,
        Flash::info("If an account with that email exists, a reset link has been emailed to it"),
    )
    .await?;

    Ok(Redirect::to("/login").into_response())
}

/// Display the reset form for a token, bouncing expired links to login.
pub async fn reset_page(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    if auth.validate_reset_token(&token).await.is_err() {
        set_flash(
            &session,
            Flash::error("Reset link is invalid or has expired"),
        )
        .await?;
        return Ok(Redirect::to("/login").into_response());
    }

    Ok(ResetTemplate {
        current_user: None,
        flash: take_flash(&session).await?,
        token,
    }
    .into_response())
}

/// Handle the reset form. A successful reset also logs the user in.
pub async fn reset(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
    Form(form): Form<ResetForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    match auth
        .complete_reset(&token, &form.password, &form.password_confirm)
        .await
    {
        Ok(user) => {
            log_in(&session, &user).await?;
            set_flash(
                &session,
                Flash::success("Nice! Your password has been reset and you are now logged in!"),
            )
            .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidResetToken) => {
            set_flash(
                &session,
                Flash::error("Reset link is invalid or has expired"),
            )
            .await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => {
            set_flash(&session, Flash::error(e.user_message())).await?;
            Ok(Redirect::to(&format!("/account/reset/{token}")).into_response())
        }
    }
}
