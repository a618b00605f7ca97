//! JC Closet storefront library.
//!
//! The public shop as a library so the router can be exercised in tests
//! without a database or a live backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod markdown;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
