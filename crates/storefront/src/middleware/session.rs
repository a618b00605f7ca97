//! Session middleware configuration.
//!
//! Visitor sessions live in `PostgreSQL` via tower-sessions. They hold the
//! cart, the backend session id and the last-activity timestamp.

use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "jc_session";

/// Cookie lifetime after the last request (14 days, long enough to keep a cart).
const SESSION_EXPIRY_DAYS: i64 = 14;

/// Create the session layer backed by `PostgreSQL`.
///
/// The `tower_sessions` table is created by `jc-closet-cli migrate storefront`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    configure(PostgresStore::new(pool.clone()), config.is_https())
}

/// Apply the storefront cookie settings to any store.
#[must_use]
pub fn configure<S: SessionStore + Clone>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_EXPIRY_DAYS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
