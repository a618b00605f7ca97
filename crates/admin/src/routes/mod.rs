//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready          - Liveness / readiness
//!
//! # Auth (backend login, bearer token kept in the session)
//! GET  /auth/login                     - Login page
//! POST /auth/login                     - Sign in
//! POST /auth/logout                    - Sign out
//!
//! # Console (all require an admin)
//! GET  /                               - Dashboard
//! GET  /analytics                      - KPIs, traffic, top pages (?range=7d|30d|90d)
//! GET  /analytics/user-flow            - Sankey page
//! GET  /orders                         - Order listing (page, status, q)
//! GET  /orders/{id}                    - Order detail
//! POST /orders/{id}/status             - Move an order to a new status
//! GET  /customers                      - Customer listing (page, q)
//! GET  /products                       - Products with promotion state
//! GET  /products/{id}/promo            - Promotion editor
//! POST /products/{id}/promo            - Save promotion
//! GET  /articles                       - Blog articles
//! GET  /articles/new, POST             - Create
//! GET  /articles/{id}/edit, POST       - Edit
//! POST /articles/{id}/delete           - Delete
//! GET  /appointments                   - Bookings
//! POST /appointments/{id}/status       - Confirm / complete / cancel
//! GET  /newsletter                     - Subscribers
//!
//! # JSON
//! GET  /api/analytics/user-flow        - Sankey nodes and links
//! GET  /api/analytics/traffic          - Traffic series
//! POST /preferences/notifications      - Toggle order notifications
//! GET  /push/public-key                - VAPID key
//! POST /push/admin/subscribe           - Register this browser for order pushes
//! GET  /sw.js                          - Service worker
//! ```

pub mod analytics;
pub mod api;
pub mod appointments;
pub mod articles;
pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod newsletter;
pub mod orders;
pub mod products;

use askama::Template;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    middleware::from_fn,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower::Layer;
use tower_http::services::ServeDir;
use tower_http::set_header::{SetResponseHeader, SetResponseHeaderLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::Session;

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::models::session::notifications_enabled;
use crate::models::{AdminUserView, CurrentAdmin};
use crate::state::AppState;

/// Directory static assets are served from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/admin/static";

/// Rows per page on paginated listings.
pub const PAGE_SIZE: u32 = 25;

/// Render a template, logging failures instead of panicking.
pub fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error rendering template").into_response()
        }
    }
}

/// Header data every console page needs.
pub async fn admin_view(session: &Session, admin: &CurrentAdmin) -> AdminUserView {
    AdminUserView::new(admin, notifications_enabled(session).await)
}

/// Trimmed, non-empty query value.
pub(crate) fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn static_files() -> SetResponseHeader<ServeDir, HeaderValue> {
    SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, max-age=3600"),
    )
    .layer(ServeDir::new(STATIC_DIR))
}

/// Console pages and JSON endpoints, without the session layer.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(analytics::router())
        .merge(orders::router())
        .merge(customers::router())
        .merge(products::router())
        .merge(articles::router())
        .merge(appointments::router())
        .merge(newsletter::router())
        .merge(api::router())
}

/// The complete application with its middleware, ready for a session layer.
///
/// The session layer is left to the caller so the binary can back it with
/// `PostgreSQL` and tests with an in-memory store.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", static_files())
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check: the session store must be reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use jc_closet_core::CurrencyCode;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::{AdminConfig, ApiConfig, SentryConfig};
    use crate::middleware::session::configure;

    fn test_app() -> Router {
        let config = AdminConfig {
            database_url: SecretString::from("postgres://unused"),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost".to_string(),
            session_secret: SecretString::from("unused-in-router-tests"),
            api: ApiConfig {
                base_url: "http://127.0.0.1:9/api".to_string(),
                timeout: Duration::from_millis(200),
            },
            currency: CurrencyCode::KES,
            sentry: SentryConfig::default(),
            tls: None,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://jc@127.0.0.1:1/jc")
            .unwrap();
        app(AppState::new(config, pool).unwrap()).layer(configure(MemoryStore::default(), false))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_console_pages_redirect_to_login() {
        for uri in ["/", "/customers", "/products/p1/promo", "/newsletter"] {
            let response = test_app().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(response.headers()[header::LOCATION], "/auth/login");
        }
    }

    #[tokio::test]
    async fn test_json_endpoints_answer_401() {
        for uri in ["/api/analytics/traffic", "/api/analytics/user-flow", "/push/public-key"] {
            let response = test_app().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_login_page_renders_with_headers() {
        let response = test_app().oneshot(get("/auth/login")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(response.headers().contains_key("x-request-id"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("name=\"password\""));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(&"  oud ".to_string())).as_deref(), Some("oud"));
        assert_eq!(non_empty(Some(&"   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }
}
