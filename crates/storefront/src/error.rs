//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Server-side failures (backend
//! outages, session store errors) are captured to Sentry before a generic
//! message is sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jc_closet_client::ApiError;
use jc_closet_core::CartError;
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Cart mutation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error is ours (or the backend's) rather than the visitor's.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => !matches!(
                err,
                ApiError::NotFound(_) | ApiError::Validation(_) | ApiError::RateLimited(_)
            ),
            Self::Session(_) | Self::Internal(_) => true,
            Self::Cart(_) | Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Api(err) => match err {
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::Validation(_) => StatusCode::BAD_REQUEST,
                ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                ApiError::SessionExpired => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Cart(CartError::LineNotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::OutOfStock(_)) => StatusCode::CONFLICT,
            Self::Cart(CartError::InvalidQuantity) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the visitor.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Api(err) => match err {
                ApiError::NotFound(_) => "Not found".to_string(),
                ApiError::Validation(msg) => msg.clone(),
                ApiError::RateLimited(_) => "Too many requests, please slow down".to_string(),
                ApiError::SessionExpired => "Your session expired, please try again".to_string(),
                _ => "External service error".to_string(),
            },
            Self::Cart(err) => err.to_string(),
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry reports to show the trail leading up to an
/// error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_backend_errors_map_to_gateway_statuses() {
        assert_eq!(
            status_of(ApiError::Status { status: 500, message: "boom".into() }.into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ApiError::NotFound("Perfume not found".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::Validation("email taken".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::SessionExpired.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ApiError::RateLimited(3).into()),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_cart_errors() {
        assert_eq!(
            status_of(CartError::OutOfStock("Oud Royale".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CartError::LineNotFound("p1||".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CartError::InvalidQuantity.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_backend_details_are_hidden() {
        let err = AppError::from(ApiError::Status {
            status: 500,
            message: "MongoError: connection refused".into(),
        });
        assert_eq!(err.public_message(), "External service error");

        let err = AppError::from(ApiError::Validation("Email already subscribed".into()));
        assert_eq!(err.public_message(), "Email already subscribed");
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Article".to_string());
        assert_eq!(err.to_string(), "Not found: Article");
        assert_eq!(err.public_message(), "Article not found");
    }
}
