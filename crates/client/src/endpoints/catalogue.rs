use jc_closet_core::ProductId;
use tracing::instrument;

use crate::client::{ApiContext, NO_QUERY, segment};
use crate::error::ApiResult;
use crate::models::{Perfume, ProductPage, ProductQuery};
use crate::session::SessionCache;

/// Maximum suggestions returned for the search box.
pub const SUGGESTION_LIMIT: u32 = 6;

impl<S: SessionCache> ApiContext<'_, S> {
    /// List perfumes. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_perfumes(&self, query: &ProductQuery) -> ApiResult<ProductPage> {
        self.get_cached(query.cache_key(), "/perfumes", query).await
    }

    /// Get one perfume. Cached.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the perfume does not exist, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_perfume(&self, id: &ProductId) -> ApiResult<Perfume> {
        let path = format!("/perfumes/{}", segment(id.as_str())?);
        self.get_cached(format!("perfume:{id}"), &path, NO_QUERY)
            .await
    }

    /// Up to [`SUGGESTION_LIMIT`] perfumes matching `term`. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_suggestions(&self, term: &str) -> ApiResult<Vec<Perfume>> {
        let query = ProductQuery {
            search: Some(term.trim().to_lowercase()),
            limit: Some(SUGGESTION_LIMIT),
            ..ProductQuery::default()
        };
        let page = self.list_perfumes(&query).await?;
        Ok(page.items)
    }
}
