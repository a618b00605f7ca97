//! Order listing, detail and status changes.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Redirect, Response},
    routing::{get, post},
};
use jc_closet_client::models::{OrderQuery, Page};
use jc_closet_core::{OrderId, OrderStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::non_empty;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminUserView;
use crate::models::views::{OrderDetail, OrderRow, PageLinks, StatusOption};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub page: Option<u32>,
    pub status: Option<String>,
    pub q: Option<String>,
}

impl OrdersQuery {
    /// Backend query; an unknown status filter is dropped.
    #[must_use]
    pub fn to_api(&self) -> OrderQuery {
        OrderQuery {
            page: self.page.filter(|p| *p > 1),
            status: self.status.as_deref().and_then(OrderStatus::parse),
            search: non_empty(self.q.as_ref()),
        }
    }
}

#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub orders: Vec<OrderRow>,
    pub statuses: Vec<StatusOption>,
    pub q: String,
    pub links: PageLinks,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub order: OrderDetail,
    pub statuses: Vec<StatusOption>,
    pub updated: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowQuery {
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}", get(show))
        .route("/orders/{id}/status", post(update_status))
}

/// GET /orders
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrdersQuery>,
) -> Response {
    let api_query = query.to_api();
    let (page, error) = match state
        .admin_api(&session, &admin)
        .admin_list_orders(&api_query)
        .await
    {
        Ok(page) => (page, None),
        Err(e) => {
            tracing::error!("Failed to fetch orders: {e}");
            (Page::default(), Some("Orders could not be loaded.".to_string()))
        }
    };

    let currency = state.config().currency;
    let q = api_query.search.clone().unwrap_or_default();
    let status = api_query.status.map_or("", OrderStatus::as_str);

    super::render(&OrdersTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/orders".to_string(),
        orders: page
            .items
            .iter()
            .map(|order| OrderRow::new(order, currency))
            .collect(),
        statuses: StatusOption::orders(api_query.status),
        links: PageLinks::new(&page, "/orders", &[("status", status), ("q", &q)]),
        q,
        error,
    })
}

/// GET /orders/{id}
#[instrument(skip(admin, state, session))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ShowQuery>,
) -> Result<Response> {
    let order = state
        .admin_api(&session, &admin)
        .admin_get_order(&OrderId::new(id))
        .await?;

    Ok(super::render(&OrderShowTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/orders".to_string(),
        statuses: StatusOption::orders(Some(order.status)),
        order: OrderDetail::new(&order, state.config().currency),
        updated: query.updated.is_some(),
    }))
}

/// POST /orders/{id}/status
#[instrument(skip(admin, state, session, form))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let status = OrderStatus::parse(form.status.trim())
        .ok_or_else(|| AppError::BadRequest(format!("Unknown order status: {}", form.status)))?;
    let order_id = OrderId::new(id);

    state
        .admin_api(&session, &admin)
        .admin_update_order_status(&order_id, status)
        .await?;

    tracing::info!(order_id = %order_id, status = status.as_str(), "Order status updated");
    Ok(Redirect::to(&format!("/orders/{order_id}?updated=1")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mapping() {
        let query = OrdersQuery {
            page: Some(1),
            status: Some("shipped".to_string()),
            q: Some("  JC-10 ".to_string()),
        };
        let api = query.to_api();
        assert_eq!(api.page, None);
        assert_eq!(api.status, Some(OrderStatus::Shipped));
        assert_eq!(api.search.as_deref(), Some("JC-10"));

        let bogus = OrdersQuery {
            status: Some("unknown".to_string()),
            ..OrdersQuery::default()
        };
        assert_eq!(bogus.to_api().status, None);
    }
}
