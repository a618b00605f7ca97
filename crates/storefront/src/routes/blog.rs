//! Blog route handlers.
//!
//! Articles come from the backend; bodies are Markdown rendered on the way
//! out. Unpublished articles are never shown.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use jc_closet_client::ApiError;
use jc_closet_client::models::Article;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::AnalyticsConfig;
use crate::error::{AppError, Result};
use crate::filters;
use crate::markdown;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Length of the generated summary when an article has no excerpt.
const SUMMARY_CHARS: usize = 180;

/// Number of other articles listed under a post.
const RECENT_COUNT: usize = 3;

/// Article view for templates.
#[derive(Clone)]
pub struct ArticleView {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub author: Option<String>,
    /// e.g. "12 March 2026".
    pub published_on: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub reading_time_minutes: u32,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            slug: article.slug.clone(),
            title: article.title.clone(),
            summary: article.summary(SUMMARY_CHARS),
            author: article.author.clone(),
            published_on: article
                .published_at
                .map(|d| d.format("%-d %B %Y").to_string()),
            cover_image: article.cover_image.clone(),
            tags: article.tags.clone(),
            reading_time_minutes: markdown::reading_time_minutes(&article.content),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub articles: Vec<ArticleView>,
    pub error: Option<String>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub article: ArticleView,
    pub content_html: String,
    pub recent: Vec<ArticleView>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
    pub base_url: String,
}

/// Published articles, newest first.
fn published(mut articles: Vec<Article>) -> Vec<Article> {
    articles.retain(|a| a.published);
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles
}

/// Blog index.
#[instrument(skip(state, session, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> BlogIndexTemplate {
    let (articles, error) = match state.api().scope(&session).list_articles().await {
        Ok(articles) => (
            published(articles).iter().map(ArticleView::from).collect(),
            None,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load articles");
            (Vec::new(), Some("Articles are unavailable right now.".to_string()))
        }
    };

    BlogIndexTemplate {
        articles,
        error,
        analytics: state.config().analytics.clone(),
        nonce,
    }
}

/// A single article by slug.
///
/// # Errors
///
/// Returns 404 if the article doesn't exist or is unpublished.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<BlogShowTemplate> {
    let api = state.api().scope(&session);
    let article = match api.get_article_by_slug(&slug).await {
        Ok(article) if article.published => article,
        Ok(_) | Err(ApiError::NotFound(_)) => return Err(AppError::NotFound("Article".to_string())),
        Err(e) => return Err(e.into()),
    };

    // The sidebar is optional; a failure here only hides it.
    let recent = api
        .list_articles()
        .await
        .map(|all| {
            published(all)
                .iter()
                .filter(|a| a.slug != article.slug)
                .take(RECENT_COUNT)
                .map(ArticleView::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(BlogShowTemplate {
        content_html: markdown::render(&article.content),
        article: ArticleView::from(&article),
        recent,
        analytics: state.config().analytics.clone(),
        nonce,
        base_url: state.config().base_url.clone(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{slug}", get(show))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn article(slug: &str, published: bool, at: Option<&str>) -> Article {
        serde_json::from_value(serde_json::json!({
            "_id": slug,
            "slug": slug,
            "title": slug,
            "content": "Layering scents is an art.",
            "published": published,
            "publishedAt": at,
        }))
        .unwrap()
    }

    #[test]
    fn test_published_newest_first() {
        let articles = published(vec![
            article("old", true, Some("2026-01-05T08:00:00Z")),
            article("draft", false, Some("2026-09-01T08:00:00Z")),
            article("new", true, Some("2026-03-12T08:00:00Z")),
        ]);

        let slugs: Vec<_> = articles.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, ["new", "old"]);
    }

    #[test]
    fn test_article_view_formats_date() {
        let view = ArticleView::from(&article("new", true, Some("2026-03-12T08:00:00Z")));
        assert_eq!(view.published_on.as_deref(), Some("12 March 2026"));
        assert_eq!(view.reading_time_minutes, 1);
        assert_eq!(view.summary, "Layering scents is an art.");
    }
}
