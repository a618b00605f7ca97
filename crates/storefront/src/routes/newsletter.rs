//! Newsletter subscription route handler.
//!
//! The footer form posts here via HTMX and is replaced by one of two
//! fragments. An address that is already subscribed counts as success.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use jc_closet_client::ApiError;
use jc_closet_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::state::AppState;

/// Newsletter subscription form data.
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    pub email: String,
}

/// Success fragment (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/newsletter_success.html")]
pub struct SubscribeSuccessTemplate {
    pub email: String,
}

/// Error fragment (replaces the form via HTMX, keeping the input).
#[derive(Template, WebTemplate)]
#[template(path = "partials/newsletter_error.html")]
pub struct SubscribeErrorTemplate {
    pub message: String,
    pub email: String,
}

/// Whether a backend rejection means "already on the list".
fn already_subscribed(reason: &str) -> bool {
    let reason = reason.to_lowercase();
    reason.contains("already subscribed") || reason.contains("already exists")
}

/// Subscribe to the newsletter (HTMX).
#[instrument(skip(state, session, form))]
pub async fn subscribe(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SubscribeForm>,
) -> Response {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(_) => {
            return SubscribeErrorTemplate {
                message: "Please enter a valid email address.".to_string(),
                email: form.email.trim().to_string(),
            }
            .into_response();
        }
    };

    match state
        .api()
        .scope(&session)
        .subscribe_newsletter(email.as_str())
        .await
    {
        Ok(()) => {
            tracing::info!(domain = email.domain(), "Newsletter subscription successful");
            SubscribeSuccessTemplate {
                email: email.into_inner(),
            }
            .into_response()
        }
        Err(ApiError::Validation(reason)) if already_subscribed(&reason) => {
            tracing::info!("Address already subscribed, treating as success");
            SubscribeSuccessTemplate {
                email: email.into_inner(),
            }
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Newsletter subscription failed");
            SubscribeErrorTemplate {
                message: "Something went wrong. Please try again.".to_string(),
                email: email.into_inner(),
            }
            .into_response()
        }
    }
}
