//! JC Closet admin console.
//!
//! Staff sign in with their backend account; the console then drives the
//! backend's admin endpoints with the bearer token kept in the session.
//! Only accounts with the `admin` role get past the login form.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
