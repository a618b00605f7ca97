use jc_closet_core::ArticleId;
use reqwest::Method;
use tracing::instrument;

use crate::client::{ApiContext, NO_QUERY, segment};
use crate::error::ApiResult;
use crate::models::{Article, ArticleInput};
use crate::session::SessionCache;

impl<S: SessionCache> ApiContext<'_, S> {
    /// Published articles, newest first. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_articles(&self) -> ApiResult<Vec<Article>> {
        self.get_cached(
            "articles:published".to_string(),
            "/articles",
            &[("published", "true")],
        )
        .await
    }

    /// A published article by slug. Cached.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown slug, or another error if the API
    /// request fails.
    #[instrument(skip(self))]
    pub async fn get_article_by_slug(&self, slug: &str) -> ApiResult<Article> {
        self.get_cached(
            format!("article:{slug}"),
            &format!("/articles/slug/{}", segment(slug)?),
            NO_QUERY,
        )
        .await
    }

    /// Every article, drafts included.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_list_articles(&self) -> ApiResult<Vec<Article>> {
        self.get("/admin/articles").await
    }

    /// One article by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn admin_get_article(&self, id: &ArticleId) -> ApiResult<Article> {
        self.get(&format!("/admin/articles/{}", segment(id.as_str())?)).await
    }

    /// Create an article.
    ///
    /// # Errors
    ///
    /// Returns `Validation` (e.g. duplicate slug) or another error if the API
    /// request fails.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn admin_create_article(&self, input: &ArticleInput) -> ApiResult<Article> {
        let article = self.post("/admin/articles", input).await?;
        self.client().invalidate_cache();
        Ok(article)
    }

    /// Replace an article.
    ///
    /// # Errors
    ///
    /// Returns `Validation` or another error if the API request fails.
    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn admin_update_article(
        &self,
        id: &ArticleId,
        input: &ArticleInput,
    ) -> ApiResult<Article> {
        let article = self
            .send_json(
                Method::PUT,
                &format!("/admin/articles/{}", segment(id.as_str())?),
                input,
            )
            .await?;
        self.client().invalidate_cache();
        Ok(article)
    }

    /// Delete an article.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn admin_delete_article(&self, id: &ArticleId) -> ApiResult<()> {
        self.delete(&format!("/admin/articles/{}", segment(id.as_str())?)).await?;
        self.client().invalidate_cache();
        Ok(())
    }
}
