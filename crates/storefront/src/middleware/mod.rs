//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Session layer (tower-sessions with `PostgreSQL` store)
//! 3. `TraceLayer` (request spans)
//! 4. Request ID
//! 5. CSP nonce
//! 6. Security headers
//! 7. Visitor activity (idle expiry, backend session, page views)
//! 8. Rate limiting (per route group)

pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod visitor;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{api_rate_limiter, form_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use visitor::visitor_middleware;
