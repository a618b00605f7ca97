//! Typed wrappers over backend endpoints, grouped by resource.
//!
//! All of them are methods on [`ApiContext`](crate::ApiContext) so they carry
//! the caller's session id and token.

mod admin;
mod analytics;
mod auth;
mod catalogue;
mod content;
mod engagement;
mod orders;

pub use catalogue::SUGGESTION_LIMIT;
