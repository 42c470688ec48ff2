//! Registration, login, and logout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    Flash, OptionalAuth, clear_current_user, set_current_user, set_flash, take_flash,
};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Store the user's identity in the session and Sentry scope.
pub(crate) async fn log_in(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
    };
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Display the login page.
pub async fn login_page(OptionalAuth(user): OptionalAuth, session: Session) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(LoginTemplate {
        current_user: None,
        flash: take_flash(&session).await?,
    }
    .into_response())
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            log_in(&session, &user).await?;
            set_flash(&session, Flash::success("You are now logged in!")).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            set_flash(&session, Flash::error("Invalid email or password")).await?;
            Ok(Redirect::to("/login").into_response())
        }
    }
}

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(RegisterTemplate {
        current_user: None,
        flash: take_flash(&session).await?,
    }
    .into_response())
}

/// Handle registration form submission. A successful registration logs the
/// user straight in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    if form.password != form.password_confirm {
        set_flash(&session, Flash::error("Passwords do not match")).await?;
        return Ok(Redirect::to("/register").into_response());
    }

    match auth.register(&form.email, &form.name, &form.password).await {
        Ok(user) => {
            log_in(&session, &user).await?;
            set_flash(
                &session,
                Flash::success(format!("Welcome, {}!", user.name)),
            )
            .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            set_flash(&session, Flash::error(e.user_message())).await?;
            Ok(Redirect::to("/register").into_response())
        }
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    set_flash(&session, Flash::success("You are now logged out!")).await?;
    Ok(Redirect::to("/").into_response())
}
