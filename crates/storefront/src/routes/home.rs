//! Home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use jc_closet_client::models::{ProductQuery, ProductSort};
use tower_sessions::Session;
use tracing::instrument;

use crate::config::AnalyticsConfig;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::ProductCard;
use crate::state::AppState;

/// Products per home page section.
const SECTION_SIZE: u32 = 8;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductCard>,
    pub new_arrivals: Vec<ProductCard>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Home page: featured products and new arrivals, fetched concurrently.
///
/// A failed section renders empty rather than failing the page.
#[instrument(skip(state, session, nonce))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> HomeTemplate {
    let api = state.api().scope(&session);

    let featured_query = ProductQuery {
        featured: true,
        limit: Some(SECTION_SIZE),
        ..ProductQuery::default()
    };
    let newest_query = ProductQuery {
        sort: Some(ProductSort::Newest),
        limit: Some(SECTION_SIZE),
        ..ProductQuery::default()
    };

    let (featured, newest) = tokio::join!(
        api.list_perfumes(&featured_query),
        api.list_perfumes(&newest_query)
    );

    let now = chrono::Utc::now();
    let currency = state.config().currency;
    let cards = |result: jc_closet_client::ApiResult<jc_closet_client::models::ProductPage>,
                 section: &str| {
        match result {
            Ok(page) => ProductCard::all(&page.items, now, currency),
            Err(e) => {
                tracing::warn!(error = %e, section, "Home section unavailable");
                Vec::new()
            }
        }
    };

    HomeTemplate {
        featured: cards(featured, "featured"),
        new_arrivals: cards(newest, "new_arrivals"),
        analytics: state.config().analytics.clone(),
        nonce,
    }
}
