//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home (featured + new arrivals)
//! GET  /health, /health/ready     - Liveness / readiness
//!
//! # Catalogue
//! GET  /shop                      - Listing (page, category, sort, q)
//! GET  /shop/{id}                 - Product detail
//! GET  /search                    - Full search results
//! GET  /search/suggest            - Suggestions fragment (HTMX, debounced)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add line (returns badge, triggers cart-updated)
//! POST /cart/update               - Set quantity (returns cart_items fragment)
//! POST /cart/remove               - Remove line (returns cart_items fragment)
//! GET  /cart/count                - Badge fragment
//!
//! # Checkout
//! GET  /checkout                  - Checkout form
//! POST /checkout                  - Create the order, clear the cart, redirect
//! GET  /checkout/complete/{id}    - Confirmation
//!
//! # Content and engagement
//! GET  /blog, /blog/{slug}        - Articles
//! GET  /appointments              - Booking form
//! POST /appointments              - Book
//! POST /contact                   - Contact message (JSON)
//! POST /newsletter/subscribe      - Subscribe (fragment)
//! GET  /push/public-key           - VAPID key
//! POST /push/subscribe            - Forward a browser push subscription
//! GET  /sw.js                     - Service worker
//! ```

pub mod appointments;
pub mod blog;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod newsletter;
pub mod push;
pub mod search;
pub mod shop;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use axum::http::{HeaderValue, header};
use tower::Layer;
use tower_http::services::ServeDir;
use tower_http::set_header::{SetResponseHeader, SetResponseHeaderLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    api_rate_limiter, csp_nonce_middleware, form_rate_limiter, request_id_middleware,
    security_headers_middleware, visitor_middleware,
};
use crate::state::AppState;

/// Directory static assets are served from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Cache lifetime for fingerprinted assets under `*/derived/`.
const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Cache lifetime for everything else under `/static`.
const STATIC_CACHE: &str = "public, max-age=86400";

/// `ServeDir` for `dir` with a fixed `Cache-Control`.
fn static_files(dir: &str, cache: &'static str) -> SetResponseHeader<ServeDir, HeaderValue> {
    SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, HeaderValue::from_static(cache))
        .layer(ServeDir::new(dir))
}

/// Cart routes.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .layer(api_rate_limiter())
}

/// Routes that write to the backend for a visitor.
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::place_order))
        .route("/appointments", post(appointments::book))
        .route("/contact", post(contact::submit))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route("/push/subscribe", post(push::subscribe))
        .layer(form_rate_limiter())
}

/// All pages and fragments, without the session layer.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/shop", shop::router())
        .nest("/search", search::router())
        .nest("/cart", cart_routes())
        .nest("/blog", blog::router())
        .route("/checkout", get(checkout::show))
        .route("/checkout/complete/{id}", get(checkout::complete))
        .route("/appointments", get(appointments::form))
        .route("/push/public-key", get(push::public_key))
        .route("/sw.js", get(push::service_worker))
        .merge(form_routes())
}

/// The complete application with its middleware, ready for a session layer.
///
/// The session layer is left to the caller so the binary can back it with
/// `PostgreSQL` and tests with an in-memory store.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes().layer(from_fn_with_state(state.clone(), visitor_middleware)))
        .nest_service(
            "/static/css/derived",
            static_files(&format!("{STATIC_DIR}/css/derived"), IMMUTABLE),
        )
        .nest_service(
            "/static/js/derived",
            static_files(&format!("{STATIC_DIR}/js/derived"), IMMUTABLE),
        )
        .nest_service("/static", static_files(STATIC_DIR, STATIC_CACHE))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
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
    use crate::config::{AnalyticsConfig, ApiConfig, SentryConfig, StorefrontConfig};
    use crate::middleware::session::{SESSION_COOKIE_NAME, configure};

    /// The router with an in-memory session store and an unreachable backend.
    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://unused"),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost".to_string(),
            session_secret: SecretString::from("unused-in-router-tests"),
            api: ApiConfig {
                base_url: "http://127.0.0.1:9/api".to_string(),
                timeout: Duration::from_millis(200),
                cache_ttl: Duration::from_secs(60),
            },
            idle_timeout: Duration::from_secs(30 * 60),
            currency: CurrencyCode::KES,
            analytics: AnalyticsConfig::default(),
            sentry: SentryConfig::default(),
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://jc@127.0.0.1:1/jc")
            .unwrap();
        app(AppState::new(config, pool).unwrap()).layer(configure(MemoryStore::default(), false))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_carries_security_headers() {
        let response = test_app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers[header::CACHE_CONTROL], "no-store, max-age=0");
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_readiness_fails_without_session_store() {
        let response = test_app().oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_service_worker_keeps_its_cache_policy() {
        let response = test_app().oneshot(get("/sw.js")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    }

    #[tokio::test]
    async fn test_empty_cart_badge_starts_a_session() {
        let response = test_app().oneshot(get("/cart/count")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
        assert!(cookie.contains("HttpOnly"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("cart-badge"));
    }
}
