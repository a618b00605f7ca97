//! Search page and debounced suggestions.
//!
//! The search box issues `GET /search/suggest?q=` through HTMX with
//! `delay:300ms`, so a request only goes out once typing pauses. Terms
//! shorter than [`MIN_QUERY_CHARS`] non-space characters return an empty
//! fragment without touching the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use jc_closet_client::models::ProductQuery;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::AnalyticsConfig;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{PageLinks, ProductCard};
use crate::routes::shop::PAGE_SIZE;
use crate::state::AppState;

/// Minimum non-space characters before a search is run.
pub const MIN_QUERY_CHARS: usize = 2;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub page: Option<u32>,
}

/// The trimmed term, if it is long enough to search for.
fn searchable(term: &str) -> Option<&str> {
    let term = term.trim();
    let meaningful = term.chars().filter(|c| !c.is_whitespace()).count();
    (meaningful >= MIN_QUERY_CHARS).then_some(term)
}

/// Suggestions fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/suggestions.html")]
pub struct SuggestionsTemplate {
    pub query: String,
    pub suggestions: Vec<ProductCard>,
    pub failed: bool,
}

/// Full search page.
#[derive(Template, WebTemplate)]
#[template(path = "search/index.html")]
pub struct SearchPageTemplate {
    pub query: String,
    pub results: Vec<ProductCard>,
    pub total: u64,
    pub links: PageLinks,
    pub too_short: bool,
    pub error: Option<String>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Suggestions for the search box.
#[instrument(skip(state, session))]
pub async fn suggest(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> SuggestionsTemplate {
    let Some(term) = searchable(&params.q) else {
        return SuggestionsTemplate {
            query: String::new(),
            suggestions: Vec::new(),
            failed: false,
        };
    };

    match state.api().scope(&session).search_suggestions(term).await {
        Ok(found) => SuggestionsTemplate {
            query: term.to_string(),
            suggestions: ProductCard::all(&found, chrono::Utc::now(), state.config().currency),
            failed: false,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Search suggestions failed");
            SuggestionsTemplate {
                query: term.to_string(),
                suggestions: Vec::new(),
                failed: true,
            }
        }
    }
}

/// Full results page.
#[instrument(skip(state, session, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchParams>,
    CspNonce(nonce): CspNonce,
) -> SearchPageTemplate {
    let mut template = SearchPageTemplate {
        query: params.q.trim().to_string(),
        results: Vec::new(),
        total: 0,
        links: PageLinks::default(),
        too_short: false,
        error: None,
        analytics: state.config().analytics.clone(),
        nonce,
    };

    let Some(term) = searchable(&params.q) else {
        template.too_short = !template.query.is_empty();
        return template;
    };

    let query = ProductQuery {
        page: Some(params.page.unwrap_or(1).max(1)),
        limit: Some(PAGE_SIZE),
        search: Some(term.to_lowercase()),
        ..ProductQuery::default()
    };

    match state.api().scope(&session).list_perfumes(&query).await {
        Ok(page) => {
            template.results =
                ProductCard::all(&page.items, chrono::Utc::now(), state.config().currency);
            template.total = page.total;
            template.links = PageLinks::new(&page, "/search", &[("q", term)]);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Search failed");
            template.error = Some("Search is unavailable right now.".to_string());
        }
    }
    template
}

/// Create the search routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/suggest", get(suggest))
}
