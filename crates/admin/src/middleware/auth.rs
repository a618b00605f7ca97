//! Authentication extractors for admin.
//!
//! Every console route except the login page takes [`RequireAdminAuth`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::CurrentAdmin;
use crate::models::session::current_admin;

/// Extractor that requires a signed-in admin.
///
/// If nobody is logged in (or the stored role is not an admin role), HTML
/// requests are redirected to the login page and JSON endpoints get 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.display_name())
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when admin authentication is required but missing.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AdminAuthRejection {
    fn for_path(path: &str) -> Self {
        if ["/api/", "/push/", "/preferences/"]
            .iter()
            .any(|prefix| path.starts_with(prefix))
        {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let admin = current_admin(session)
            .await
            .filter(CurrentAdmin::is_admin)
            .ok_or_else(|| AdminAuthRejection::for_path(parts.uri.path()))?;

        set_sentry_user(admin.display_name(), admin.profile.email.as_deref());
        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the current admin.
///
/// Used by the login page to skip straight to the dashboard.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => current_admin(session).await.filter(CurrentAdmin::is_admin),
            None => None,
        };

        Ok(Self(admin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use jc_closet_client::models::LoginResponse;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::models::session::set_current_admin;

    fn parts_with(path: &str, session: Option<Session>) -> Parts {
        let mut request = Request::builder().uri(path).body(()).unwrap();
        if let Some(session) = session {
            request.extensions_mut().insert(session);
        }
        request.into_parts().0
    }

    async fn session_for(role: &str) -> Session {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_current_admin(
            &session,
            &LoginResponse {
                token: "tok".to_string(),
                role: role.to_string(),
                name: None,
                email: None,
            },
        )
        .await
        .unwrap();
        session
    }

    #[tokio::test]
    async fn test_admin_passes() {
        let mut parts = parts_with("/orders", Some(session_for("admin").await));
        assert!(RequireAdminAuth::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn test_pages_redirect_and_api_gets_401() {
        let empty = Session::new(None, Arc::new(MemoryStore::default()), None);

        let mut page = parts_with("/orders", Some(empty.clone()));
        assert!(matches!(
            RequireAdminAuth::from_request_parts(&mut page, &()).await,
            Err(AdminAuthRejection::RedirectToLogin)
        ));

        let mut api = parts_with("/api/analytics/traffic", Some(empty));
        assert!(matches!(
            RequireAdminAuth::from_request_parts(&mut api, &()).await,
            Err(AdminAuthRejection::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_non_admin_role_is_rejected() {
        let mut parts = parts_with("/", Some(session_for("customer").await));
        assert!(RequireAdminAuth::from_request_parts(&mut parts, &()).await.is_err());

        let mut parts = parts_with("/auth/login", Some(session_for("customer").await));
        let OptionalAdminAuth(admin) = OptionalAdminAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(admin.is_none());
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_unauthorized() {
        let mut parts = parts_with("/", None);
        assert!(matches!(
            RequireAdminAuth::from_request_parts(&mut parts, &()).await,
            Err(AdminAuthRejection::Unauthorized)
        ));
    }
}
