//! Catalogue listing and product pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use jc_closet_client::models::{ProductQuery, ProductSort};
use jc_closet_core::ProductId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{PageLinks, ProductCard, ProductDetail};
use crate::state::AppState;

/// Products per catalogue page.
pub const PAGE_SIZE: u32 = 12;

/// Categories offered in the filter bar.
pub const CATEGORIES: [(&str, &str); 4] = [
    ("women", "Women"),
    ("men", "Men"),
    ("unisex", "Unisex"),
    ("fashion", "Fashion"),
];

/// `/shop` query parameters. Empty strings from the filter form count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ShopParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub q: String,
}

impl ShopParams {
    fn sort(&self) -> ProductSort {
        ProductSort::from_str_param(&self.sort).unwrap_or_default()
    }

    fn to_query(&self) -> ProductQuery {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        ProductQuery {
            page: Some(self.page.unwrap_or(1).max(1)),
            limit: Some(PAGE_SIZE),
            category: non_empty(&self.category),
            sort: Some(self.sort()),
            search: non_empty(&self.q),
            featured: false,
        }
    }
}

/// Category filter link.
pub struct CategoryLink {
    pub value: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Sort dropdown option.
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopTemplate {
    pub products: Vec<ProductCard>,
    pub total: u64,
    pub links: PageLinks,
    pub category: String,
    pub q: String,
    pub categories: Vec<CategoryLink>,
    pub sort_options: Vec<SortOption>,
    /// Shown instead of the grid when the backend is unavailable.
    pub error: Option<String>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/show.html")]
pub struct ProductTemplate {
    pub product: ProductDetail,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Catalogue listing.
#[instrument(skip(state, session, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ShopParams>,
    CspNonce(nonce): CspNonce,
) -> ShopTemplate {
    let query = params.to_query();
    let result = state.api().scope(&session).list_perfumes(&query).await;

    let sort = params.sort();
    let sort_options = ProductSort::ALL
        .iter()
        .map(|s| SortOption {
            value: s.as_str(),
            label: s.label(),
            selected: *s == sort,
        })
        .collect();

    let (page, error) = match result {
        Ok(page) => (page, None),
        Err(e) => {
            tracing::warn!(error = %e, "Catalogue unavailable");
            (
                jc_closet_client::models::ProductPage::default(),
                Some("We couldn't load the collection right now. Please try again shortly.".to_string()),
            )
        }
    };

    let links = PageLinks::new(
        &page,
        "/shop",
        &[
            ("category", params.category.as_str()),
            ("sort", params.sort.as_str()),
            ("q", params.q.as_str()),
        ],
    );

    ShopTemplate {
        products: ProductCard::all(&page.items, chrono::Utc::now(), state.config().currency),
        total: page.total,
        links,
        categories: CATEGORIES
            .iter()
            .map(|&(value, label)| CategoryLink {
                value,
                label,
                active: params.category == value,
            })
            .collect(),
        category: params.category,
        q: params.q,
        sort_options,
        error,
        analytics: state.config().analytics.clone(),
        nonce,
    }
}

/// Product detail page.
///
/// # Errors
///
/// Returns 404 when the backend does not know the product, 502 when it is
/// unavailable.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<ProductTemplate> {
    let perfume = state
        .api()
        .scope(&session)
        .get_perfume(&ProductId::new(id))
        .await?;

    Ok(ProductTemplate {
        product: ProductDetail::new(&perfume, chrono::Utc::now(), state.config().currency),
        analytics: state.config().analytics.clone(),
        nonce,
    })
}

/// Create the shop routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filters_are_dropped() {
        let params = ShopParams {
            page: Some(0),
            category: "  ".to_string(),
            sort: "price-desc".to_string(),
            q: String::new(),
        };
        let query = params.to_query();

        assert_eq!(query.page, Some(1));
        assert_eq!(query.category, None);
        assert_eq!(query.search, None);
        assert_eq!(query.sort, Some(ProductSort::PriceDesc));
        assert_eq!(query.limit, Some(PAGE_SIZE));
    }

    #[test]
    fn test_unknown_sort_falls_back_to_newest() {
        let params = ShopParams {
            sort: "cheapest".to_string(),
            ..ShopParams::default()
        };
        assert_eq!(params.sort(), ProductSort::Newest);
    }
}
