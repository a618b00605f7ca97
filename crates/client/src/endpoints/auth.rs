use serde::de::IgnoredAny;
use tracing::instrument;

use crate::client::ApiContext;
use crate::error::ApiResult;
use crate::models::LoginResponse;
use crate::session::SessionCache;

impl<S: SessionCache> ApiContext<'_, S> {
    /// Exchange credentials for a bearer token and role.
    ///
    /// Never renews the backend session: a 401 here means bad credentials.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for bad credentials, or another error if the
    /// API request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.post_once(
            "/auth/login",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Revoke the current bearer token. Best effort.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> ApiResult<()> {
        self.post_once::<IgnoredAny, _>("/auth/logout", &serde_json::json!({}))
            .await
            .map(|_| ())
    }
}
