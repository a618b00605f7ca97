//! Analytics data for client-side charts.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use jc_closet_client::models::TrafficPoint;
use jc_closet_core::{FlowGraph, FlowOptions};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::routes::analytics::RangeQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/analytics/user-flow", get(user_flow))
        .route("/api/analytics/traffic", get(traffic))
}

/// Sankey tuning, on top of the range.
#[derive(Debug, Default, Deserialize)]
pub struct FlowQuery {
    pub range: Option<String>,
    /// Shorter paths are dropped.
    pub min_steps: Option<usize>,
    /// Cap on distinct pages in the diagram.
    pub max_nodes: Option<usize>,
}

impl FlowQuery {
    fn options(&self) -> FlowOptions {
        let defaults = FlowOptions::default();
        FlowOptions {
            min_steps: self.min_steps.unwrap_or(defaults.min_steps).max(2),
            max_nodes: self.max_nodes.unwrap_or(defaults.max_nodes).clamp(2, 100),
            ..defaults
        }
    }
}

/// GET /api/analytics/user-flow
#[instrument(skip(admin, state, session))]
pub async fn user_flow(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<FlowQuery>,
) -> Result<Json<FlowGraph>> {
    let range = RangeQuery {
        range: query.range.clone(),
    }
    .range();
    let graph = state
        .admin_api(&session, &admin)
        .user_flow_graph(range, &query.options())
        .await?;

    tracing::debug!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "User flow graph built"
    );
    Ok(Json(graph))
}

/// GET /api/analytics/traffic
#[instrument(skip(admin, state, session))]
pub async fn traffic(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<TrafficPoint>>> {
    let points = state
        .admin_api(&session, &admin)
        .analytics_traffic(query.range())
        .await?;
    Ok(Json(points))
}
