//! Application state shared across handlers.

use std::sync::Arc;

use jc_closet_client::{ApiClient, ApiContext, ApiResult};
use sqlx::PgPool;
use tower_sessions::Session;

use crate::config::AdminConfig;
use crate::models::CurrentAdmin;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    api: ApiClient,
}

impl AppState {
    /// Create the state and the backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> ApiResult<Self> {
        let api = ApiClient::new(&config.api.client_config())?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, pool, api }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
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

    /// Backend client acting as `admin`.
    #[must_use]
    pub fn admin_api<'a>(
        &'a self,
        session: &'a Session,
        admin: &'a CurrentAdmin,
    ) -> ApiContext<'a, Session> {
        self.inner
            .api
            .scope(session)
            .with_token(Some(&admin.token))
    }
}
