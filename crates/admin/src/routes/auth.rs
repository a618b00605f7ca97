//! Sign-in and sign-out.
//!
//! Credentials are checked by the backend's `/auth/login`; the returned
//! bearer token and role go into the session.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use jc_closet_client::ApiError;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user};
use crate::filters;
use crate::middleware::OptionalAdminAuth;
use crate::models::session::{clear_current_admin, current_admin, is_admin_role, set_current_admin};
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    /// Set when a backend call refused the stored token.
    pub expired: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

fn login_error(status: StatusCode, email: String, message: &str) -> Response {
    let page = super::render(&LoginTemplate {
        email,
        error: Some(message.to_string()),
    });
    (status, page).into_response()
}

/// Render the login page, or skip it when already signed in.
///
/// With `?expired` the stored token was refused by the backend, so it is
/// dropped instead of bouncing back to `/`.
///
/// GET /auth/login
async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    session: Session,
    Query(query): Query<LoginPageQuery>,
) -> Result<Response, AppError> {
    if query.expired.is_some() {
        if admin.is_some() {
            tracing::info!("Dropping expired admin token");
            clear_current_admin(&session).await?;
            clear_sentry_user();
        }
        return Ok(super::render(&LoginTemplate {
            email: String::new(),
            error: Some("Your session expired. Sign in again.".to_string()),
        }));
    }
    if admin.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(super::render(&LoginTemplate {
        email: String::new(),
        error: None,
    }))
}

/// Check credentials with the backend and store the token.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();
    if email.is_empty() || form.password.is_empty() {
        return Ok(login_error(
            StatusCode::BAD_REQUEST,
            email,
            "Enter your email and password.",
        ));
    }

    let response = match state.api().scope(&session).login(&email, &form.password).await {
        Ok(response) => response,
        Err(ApiError::Unauthorized | ApiError::Validation(_) | ApiError::NotFound(_)) => {
            tracing::warn!("Admin login rejected");
            return Ok(login_error(
                StatusCode::UNAUTHORIZED,
                email,
                "Invalid email or password.",
            ));
        }
        Err(ApiError::RateLimited(_)) => {
            return Ok(login_error(
                StatusCode::TOO_MANY_REQUESTS,
                email,
                "Too many attempts. Wait a minute and try again.",
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, "Login request failed");
            return Ok(login_error(
                StatusCode::BAD_GATEWAY,
                email,
                "Sign-in is unavailable right now.",
            ));
        }
    };

    if !is_admin_role(&response.role) {
        tracing::warn!(role = %response.role, "Non-admin account tried to sign in");
        return Ok(login_error(
            StatusCode::FORBIDDEN,
            email,
            "This account does not have admin access.",
        ));
    }

    set_current_admin(&session, &response).await?;
    tracing::info!("Admin signed in");
    Ok(Redirect::to("/").into_response())
}

/// Revoke the token at the backend and clear the session.
///
/// POST /auth/logout
#[instrument(skip(state, session))]
async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect, AppError> {
    if let Some(admin) = current_admin(&session).await {
        if let Err(e) = state.admin_api(&session, &admin).logout().await {
            tracing::warn!(error = %e, "Backend logout failed");
        }
    }

    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login"))
}
