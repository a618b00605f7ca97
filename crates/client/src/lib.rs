//! JC Closet backend client.
//!
//! Every call to the remote REST backend goes through one request helper that
//! prefixes the base URL, attaches the visitor's `x-session-id` and an admin
//! bearer token when present, and speaks JSON.
//!
//! # Session renewal
//!
//! A response with status 401 or 440, or a JSON body whose `error` or
//! `message` says "session expired", makes the client drop the cached session
//! id, start a new backend session, and retry the original call. The number of
//! renewals per call is capped by [`RetryPolicy`] (one by default); past the
//! cap the call fails with [`ApiError::SessionExpired`].
//!
//! # Example
//!
//! ```rust,ignore
//! use jc_closet_client::{ApiClient, ApiClientConfig, MemorySessionCache};
//!
//! let client = ApiClient::new(&ApiClientConfig::new("https://api.jccloset.com/api"))?;
//! let session = MemorySessionCache::default();
//! let api = client.scope(&session);
//!
//! let page = api.list_perfumes(&Default::default()).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod endpoints;
pub mod error;
pub mod models;
pub mod session;

pub use client::{ApiClient, ApiClientConfig, ApiContext, SESSION_HEADER};
pub use endpoints::SUGGESTION_LIMIT;
pub use error::{ApiError, ApiResult};
pub use session::{
    LAST_ACTIVITY_KEY, MemorySessionCache, NoSession, RetryPolicy, SESSION_ID_KEY, SessionCache,
};
