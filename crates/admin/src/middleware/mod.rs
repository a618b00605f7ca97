//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Session layer (tower-sessions with `PostgreSQL` store)
//! 3. `TraceLayer` (request spans)
//! 4. Request ID
//! 5. Security headers (stricter CSP for admin)
//!
//! Authentication is an extractor ([`RequireAdminAuth`]) rather than a layer,
//! so the login page and health checks need no exemption list.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AdminAuthRejection, OptionalAdminAuth, RequireAdminAuth};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
