//! Storefront analytics pages.
//!
//! The overview, traffic series and top pages are fetched in parallel. The
//! traffic chart is a server-rendered SVG; the user-flow Sankey is drawn in
//! the browser from `/api/analytics/user-flow`.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Response,
    routing::get,
};
use jc_closet_client::models::{AnalyticsOverview, AnalyticsRange, TopPage, TrafficPoint};
use jc_closet_core::{FlowGraph, FlowOptions};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminUserView;
use crate::state::AppState;

/// Height of the traffic chart's SVG viewBox.
pub const CHART_HEIGHT: u32 = 100;

/// Horizontal space per day in the traffic chart.
const BAR_SLOT: u32 = 10;

/// Links listed under the Sankey diagram.
const FLOW_TABLE_ROWS: usize = 15;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

impl RangeQuery {
    #[must_use]
    pub fn range(&self) -> AnalyticsRange {
        AnalyticsRange::from_param(self.range.as_deref())
    }
}

/// Range picker option.
#[derive(Debug, Clone)]
pub struct RangeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn range_options(current: AnalyticsRange) -> Vec<RangeOption> {
    AnalyticsRange::ALL
        .iter()
        .map(|range| RangeOption {
            value: range.as_str(),
            label: range.label(),
            selected: *range == current,
        })
        .collect()
}

/// KPI cards, formatted.
#[derive(Debug, Clone)]
pub struct OverviewView {
    pub visitors: u64,
    pub sessions: u64,
    pub page_views: u64,
    pub avg_session: String,
    pub bounce_rate: String,
    pub conversion_rate: String,
}

impl From<&AnalyticsOverview> for OverviewView {
    fn from(overview: &AnalyticsOverview) -> Self {
        Self {
            visitors: overview.visitors,
            sessions: overview.sessions,
            page_views: overview.page_views,
            avg_session: overview.avg_session_display(),
            bounce_rate: format!("{:.1}%", overview.bounce_rate),
            conversion_rate: format!("{:.1}%", overview.conversion_rate),
        }
    }
}

/// One day in the traffic chart, already laid out in viewBox units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficBar {
    pub date: String,
    pub visitors: u64,
    pub page_views: u64,
    pub x: u32,
    pub y: u32,
    pub height: u32,
}

/// The traffic chart.
#[derive(Debug, Clone, Default)]
pub struct TrafficChart {
    pub bars: Vec<TrafficBar>,
    pub width: u32,
    pub peak: u64,
}

impl TrafficChart {
    /// Scale page views so the busiest day fills the chart. A day with any
    /// traffic keeps at least one unit of height.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(points: &[TrafficPoint]) -> Self {
        let peak = points.iter().map(|p| p.page_views).max().unwrap_or(0);
        let bars = points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let height = if peak == 0 {
                    0
                } else {
                    let scaled = point.page_views * u64::from(CHART_HEIGHT) / peak;
                    (scaled as u32).max(u32::from(point.page_views > 0))
                };
                let slot = u32::try_from(i).unwrap_or(u32::MAX).saturating_mul(BAR_SLOT);
                TrafficBar {
                    date: point.date.clone(),
                    visitors: point.visitors,
                    page_views: point.page_views,
                    x: slot.saturating_add(1),
                    y: CHART_HEIGHT - height,
                    height,
                }
            })
            .collect::<Vec<_>>();
        let width = u32::try_from(bars.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(BAR_SLOT)
            .max(BAR_SLOT);

        Self { bars, width, peak }
    }
}

/// Analytics overview template.
#[derive(Template)]
#[template(path = "analytics/index.html")]
pub struct AnalyticsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub ranges: Vec<RangeOption>,
    pub range_label: &'static str,
    pub overview: Option<OverviewView>,
    pub chart: TrafficChart,
    pub top_pages: Vec<TopPage>,
    /// One message per section that failed to load.
    pub errors: Vec<String>,
}

/// A link in the table under the Sankey diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLinkRow {
    pub source: String,
    pub target: String,
    pub value: u64,
}

/// The heaviest links, by name.
#[must_use]
pub fn top_links(graph: &FlowGraph, limit: usize) -> Vec<FlowLinkRow> {
    let name = |i: usize| graph.nodes.get(i).map_or_else(String::new, |n| n.name.clone());
    graph
        .links
        .iter()
        .take(limit)
        .map(|link| FlowLinkRow {
            source: name(link.source),
            target: name(link.target),
            value: link.value,
        })
        .collect()
}

/// User flow template.
#[derive(Template)]
#[template(path = "analytics/user_flow.html")]
pub struct UserFlowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub ranges: Vec<RangeOption>,
    pub range: &'static str,
    pub links: Vec<FlowLinkRow>,
    pub node_count: usize,
    pub total_weight: u64,
    pub error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(index))
        .route("/analytics/user-flow", get(user_flow))
}

/// GET /analytics
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = query.range();
    let api = state.admin_api(&session, &admin);
    let (overview, traffic, top_pages) = tokio::join!(
        api.analytics_overview(range),
        api.analytics_traffic(range),
        api.analytics_top_pages(range)
    );

    let mut errors = Vec::new();
    let overview = match overview {
        Ok(overview) => Some(OverviewView::from(&overview)),
        Err(e) => {
            tracing::error!("Failed to fetch analytics overview: {e}");
            errors.push("Overview figures are unavailable.".to_string());
            None
        }
    };
    let chart = match traffic {
        Ok(points) => TrafficChart::new(&points),
        Err(e) => {
            tracing::error!("Failed to fetch traffic: {e}");
            errors.push("Traffic data is unavailable.".to_string());
            TrafficChart::default()
        }
    };
    let top_pages = top_pages.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch top pages: {e}");
        errors.push("Top pages are unavailable.".to_string());
        Vec::new()
    });

    super::render(&AnalyticsTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/analytics".to_string(),
        ranges: range_options(range),
        range_label: range.label(),
        overview,
        chart,
        top_pages,
        errors,
    })
}

/// GET /analytics/user-flow
#[instrument(skip(admin, state, session))]
pub async fn user_flow(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = query.range();
    let (graph, error) = match state
        .admin_api(&session, &admin)
        .user_flow_graph(range, &FlowOptions::default())
        .await
    {
        Ok(graph) => (graph, None),
        Err(e) => {
            tracing::error!("Failed to fetch user flow: {e}");
            (
                FlowGraph::default(),
                Some("User flow data is unavailable.".to_string()),
            )
        }
    };

    super::render(&UserFlowTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/analytics/user-flow".to_string(),
        ranges: range_options(range),
        range: range.as_str(),
        links: top_links(&graph, FLOW_TABLE_ROWS),
        node_count: graph.nodes.len(),
        total_weight: graph.total_weight(),
        error,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jc_closet_core::{FlowPath, build_flow_graph};

    use super::*;

    fn point(date: &str, page_views: u64) -> TrafficPoint {
        TrafficPoint {
            date: date.to_string(),
            visitors: page_views / 2,
            page_views,
        }
    }

    #[test]
    fn test_chart_scales_to_peak() {
        let chart = TrafficChart::new(&[point("10-01", 50), point("10-02", 200), point("10-03", 1)]);

        assert_eq!(chart.peak, 200);
        assert_eq!(chart.width, 30);
        let heights: Vec<u32> = chart.bars.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![25, 100, 1]);
        let second = chart.bars.get(1).unwrap();
        assert_eq!((second.x, second.y), (11, 0));
    }

    #[test]
    fn test_chart_handles_no_traffic() {
        let chart = TrafficChart::new(&[point("10-01", 0)]);
        assert_eq!(chart.bars.first().map(|b| b.height), Some(0));
        assert!(TrafficChart::new(&[]).bars.is_empty());
    }

    #[test]
    fn test_top_links_use_node_names() {
        let graph = build_flow_graph(
            &[FlowPath::new("/ → /shop → /cart", 4), FlowPath::new("/ → /blog", 9)],
            &FlowOptions::default(),
        );
        let rows = top_links(&graph, 2);
        assert_eq!(
            rows.first(),
            Some(&FlowLinkRow {
                source: "/".to_string(),
                target: "/blog".to_string(),
                value: 9
            })
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_range_options_select_current() {
        let options = range_options(AnalyticsRange::Quarter);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.selected && o.value == "90d"));
    }
}
