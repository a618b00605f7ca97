//! Customer listing.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Response,
    routing::get,
};
use jc_closet_client::models::{CustomerQuery, Page};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::non_empty;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminUserView;
use crate::models::views::{CustomerRow, PageLinks};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CustomersQuery {
    pub page: Option<u32>,
    pub q: Option<String>,
}

#[derive(Template)]
#[template(path = "customers/index.html")]
pub struct CustomersTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub customers: Vec<CustomerRow>,
    pub q: String,
    pub links: PageLinks,
    pub error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/customers", get(index))
}

/// GET /customers
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CustomersQuery>,
) -> Response {
    let api_query = CustomerQuery {
        page: query.page.filter(|p| *p > 1),
        search: non_empty(query.q.as_ref()),
    };

    let (page, error) = match state
        .admin_api(&session, &admin)
        .admin_list_customers(&api_query)
        .await
    {
        Ok(page) => (page, None),
        Err(e) => {
            tracing::error!("Failed to fetch customers: {e}");
            (
                Page::default(),
                Some("Customers could not be loaded.".to_string()),
            )
        }
    };

    let currency = state.config().currency;
    let q = api_query.search.unwrap_or_default();

    super::render(&CustomersTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/customers".to_string(),
        customers: page
            .items
            .iter()
            .map(|customer| CustomerRow::new(customer, currency))
            .collect(),
        links: PageLinks::new(&page, "/customers", &[("q", &q)]),
        q,
        error,
    })
}
