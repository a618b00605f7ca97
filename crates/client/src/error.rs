//! Errors returned by the backend client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status not covered below.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Missing or rejected credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend rejected the input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend session expired and renewing it did not help.
    #[error("Session expired")]
    SessionExpired,

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL and a path could not be joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Map a non-success status and its extracted message to an error.
    #[must_use]
    pub fn from_status(status: StatusCode, message: String, retry_after: Option<u64>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
                Self::Validation(message)
            }
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(retry_after.unwrap_or(1)),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the caller should re-authenticate.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::SessionExpired)
    }

    /// Whether the error carries a message safe to show an end user.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Validation(message) => Some(message),
            _ => None,
        }
    }
}

/// Result alias for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, String::new(), None),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "no perfume".into(), None),
            ApiError::NotFound(m) if m == "no perfume"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad email".into(), None),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new(), Some(30)),
            ApiError::RateLimited(30)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream".into(), None),
            ApiError::Status { status: 502, .. }
        ));
    }

    #[test]
    fn test_auth_errors() {
        assert!(ApiError::SessionExpired.is_auth());
        assert!(ApiError::Unauthorized.is_auth());
        assert!(!ApiError::NotFound(String::new()).is_auth());
    }

    #[test]
    fn test_only_validation_is_user_facing() {
        assert_eq!(
            ApiError::Validation("Date is in the past".into()).user_message(),
            Some("Date is in the past")
        );
        assert_eq!(
            ApiError::Status {
                status: 500,
                message: "stack trace".into()
            }
            .user_message(),
            None
        );
    }
}
