//! Application state shared across handlers.

use std::sync::Arc;

use jc_closet_client::{ApiClient, ApiResult};
use sqlx::PgPool;

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    api: ApiClient,
}

impl AppState {
    /// Create the state and the backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built (bad base URL).
    pub fn new(config: StorefrontConfig, pool: PgPool) -> ApiResult<Self> {
        let api = ApiClient::new(&config.api.client_config())?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, pool, api }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Session store pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Backend REST client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }
}
