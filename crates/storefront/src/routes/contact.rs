//! Contact form route handler.
//!
//! Messages are forwarded to the backend, which notifies the shop staff.

use axum::{Json, extract::State, http::StatusCode};
use jc_closet_client::ApiError;
use jc_closet_client::models::ContactMessage;
use jc_closet_core::Email;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::state::AppState;

/// Longest message accepted.
const MAX_MESSAGE_CHARS: usize = 5000;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ContactResponse {
    fn failed(status: StatusCode, message: &str) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: false,
                message: Some(message.to_string()),
            }),
        )
    }
}

impl ContactForm {
    /// Validate and normalize into the backend payload.
    fn into_message(self) -> Result<ContactMessage, &'static str> {
        let email = Email::parse(&self.email).map_err(|_| "Please enter a valid email address.")?;
        let name = self.name.trim();
        let message = self.message.trim();
        if name.is_empty() || message.is_empty() {
            return Err("Name and message are required.");
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err("Message is too long.");
        }

        Ok(ContactMessage {
            name: name.to_string(),
            email: email.into_inner(),
            subject: self
                .subject
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            message: message.to_string(),
        })
    }
}

/// Submit a contact message.
///
/// POST /contact
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<ContactForm>,
) -> (StatusCode, Json<ContactResponse>) {
    let message = match form.into_message() {
        Ok(message) => message,
        Err(reason) => return ContactResponse::failed(StatusCode::BAD_REQUEST, reason),
    };

    match state.api().scope(&session).send_contact(&message).await {
        Ok(()) => {
            tracing::info!(email = %message.email, "Contact message sent");
            (
                StatusCode::OK,
                Json(ContactResponse {
                    success: true,
                    message: None,
                }),
            )
        }
        Err(ApiError::Validation(reason)) => ContactResponse::failed(StatusCode::BAD_REQUEST, &reason),
        Err(e) => {
            tracing::error!(error = %e, "Failed to send contact message");
            ContactResponse::failed(
                StatusCode::BAD_GATEWAY,
                "Something went wrong. Please try again.",
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: " Amina ".to_string(),
            email: email.to_string(),
            subject: Some("   ".to_string()),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_into_message_normalizes() {
        let message = form("Amina@Example.com", " Do you ship to Mombasa? ")
            .into_message()
            .unwrap();
        assert_eq!(message.name, "Amina");
        assert_eq!(message.message, "Do you ship to Mombasa?");
        assert!(message.subject.is_none());
    }

    #[test]
    fn test_into_message_rejects_bad_input() {
        assert_eq!(
            form("amina", "hi").into_message().unwrap_err(),
            "Please enter a valid email address."
        );
        assert_eq!(
            form("amina@example.com", "  ").into_message().unwrap_err(),
            "Name and message are required."
        );
        assert_eq!(
            form("amina@example.com", &"x".repeat(MAX_MESSAGE_CHARS + 1))
                .into_message()
                .unwrap_err(),
            "Message is too long."
        );
    }
}
