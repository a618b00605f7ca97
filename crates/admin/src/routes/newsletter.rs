//! Newsletter subscribers.

use askama::Template;
use axum::{Router, extract::State, response::Response, routing::get};
use jc_closet_client::models::Subscriber;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminUserView;
use crate::models::views::date;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct SubscriberRow {
    pub email: String,
    pub active: bool,
    pub subscribed: String,
}

#[derive(Template)]
#[template(path = "newsletter/index.html")]
pub struct NewsletterTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub subscribers: Vec<SubscriberRow>,
    pub total: usize,
    pub active: usize,
    pub error: Option<String>,
}

/// Newest subscribers first.
fn rows(mut subscribers: Vec<Subscriber>) -> Vec<SubscriberRow> {
    subscribers.sort_by(|a, b| b.subscribed_at.cmp(&a.subscribed_at));
    subscribers
        .into_iter()
        .map(|s| SubscriberRow {
            subscribed: date(s.subscribed_at),
            email: s.email,
            active: s.active,
        })
        .collect()
}

pub fn router() -> Router<AppState> {
    Router::new().route("/newsletter", get(index))
}

/// GET /newsletter
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let (subscribers, error) = match state
        .admin_api(&session, &admin)
        .admin_list_subscribers()
        .await
    {
        Ok(list) => (rows(list), None),
        Err(e) => {
            tracing::error!("Failed to fetch subscribers: {e}");
            (
                Vec::new(),
                Some("Subscribers could not be loaded.".to_string()),
            )
        }
    };

    super::render(&NewsletterTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/newsletter".to_string(),
        total: subscribers.len(),
        active: subscribers.iter().filter(|s| s.active).count(),
        subscribers,
        error,
    })
}
