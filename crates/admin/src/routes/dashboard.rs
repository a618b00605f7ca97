//! Dashboard route handler.

use askama::Template;
use axum::{Router, extract::State, response::Response, routing::get};
use jc_closet_client::models::{AdminStats, AnalyticsRange, Perfume};
use jc_closet_core::CurrencyCode;
use tower_sessions::Session;
use tracing::instrument;

use super::analytics::OverviewView;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminUserView;
use crate::models::views::{LOW_STOCK_THRESHOLD, OrderRow, money};
use crate::state::AppState;

/// Headline figures.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub orders: u64,
    pub pending: u64,
    pub revenue: String,
    pub customers: u64,
    pub products: u64,
}

/// A product that needs restocking.
#[derive(Debug, Clone)]
pub struct LowStockView {
    pub id: String,
    pub name: String,
    pub stock: u32,
}

impl LowStockView {
    fn from_perfume(perfume: &Perfume) -> Option<Self> {
        perfume
            .stock
            .filter(|stock| *stock <= LOW_STOCK_THRESHOLD)
            .map(|stock| Self {
                id: perfume.id.to_string(),
                name: perfume.name.clone(),
                stock,
            })
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub metrics: Option<DashboardMetrics>,
    pub recent_orders: Vec<OrderRow>,
    pub low_stock: Vec<LowStockView>,
    /// Last 7 days of storefront traffic.
    pub overview: Option<OverviewView>,
}

/// Split the stats response into the dashboard's sections.
fn sections(
    stats: &AdminStats,
    currency: CurrencyCode,
) -> (DashboardMetrics, Vec<OrderRow>, Vec<LowStockView>) {
    let metrics = DashboardMetrics {
        orders: stats.total_orders,
        pending: stats.pending_orders,
        revenue: money(stats.total_revenue, currency),
        customers: stats.total_customers,
        products: stats.total_products,
    };
    let recent = stats
        .recent_orders
        .iter()
        .take(5)
        .map(|order| OrderRow::new(order, currency))
        .collect();
    let mut low_stock: Vec<LowStockView> = stats
        .low_stock
        .iter()
        .filter_map(LowStockView::from_perfume)
        .collect();
    low_stock.sort_by_key(|p| p.stock);

    (metrics, recent, low_stock)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Dashboard page handler.
///
/// Stats and traffic are fetched in parallel; either may fail without
/// blanking the other.
#[instrument(skip(admin, state, session))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let api = state.admin_api(&session, &admin);
    let (stats_result, overview_result) = tokio::join!(
        api.admin_stats(),
        api.analytics_overview(AnalyticsRange::Week)
    );

    let (metrics, recent_orders, low_stock) = match stats_result {
        Ok(stats) => {
            let (metrics, recent, low) = sections(&stats, state.config().currency);
            (Some(metrics), recent, low)
        }
        Err(e) => {
            tracing::error!("Failed to fetch admin stats: {e}");
            (None, Vec::new(), Vec::new())
        }
    };

    let overview = match overview_result {
        Ok(overview) => Some(OverviewView::from(&overview)),
        Err(e) => {
            tracing::warn!("Failed to fetch traffic overview: {e}");
            None
        }
    };

    super::render(&DashboardTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/".to_string(),
        metrics,
        recent_orders,
        low_stock,
        overview,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jc_closet_core::{ProductId, PromoTerms};
    use rust_decimal::Decimal;

    use super::*;

    fn perfume(id: &str, stock: Option<u32>) -> Perfume {
        Perfume {
            id: ProductId::new(id),
            name: format!("Perfume {id}"),
            brand: None,
            description: None,
            category: None,
            gender: None,
            price: Decimal::from(1000),
            sizes: Vec::new(),
            colors: Vec::new(),
            images: Vec::new(),
            stock,
            featured: false,
            promo: PromoTerms::default(),
            created_at: None,
        }
    }

    #[test]
    fn test_sections_sort_low_stock_and_format_revenue() {
        let stats = AdminStats {
            total_orders: 12,
            pending_orders: 3,
            total_revenue: Decimal::from(150_000),
            low_stock: vec![
                perfume("a", Some(4)),
                perfume("b", Some(0)),
                perfume("c", Some(40)),
                perfume("d", None),
            ],
            ..AdminStats::default()
        };

        let (metrics, recent, low) = sections(&stats, CurrencyCode::KES);
        assert_eq!(metrics.revenue, "KSh 150,000");
        assert!(recent.is_empty());
        let ids: Vec<&str> = low.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
