//! Web push for order notifications.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use jc_closet_client::models::{PushSubscription, VapidPublicKey};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::session::notifications_enabled;
use crate::state::AppState;

const SERVICE_WORKER_JS: &str = include_str!("../../../static/sw.js");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/push/public-key", get(public_key))
        .route("/push/admin/subscribe", post(subscribe))
        .route("/sw.js", get(service_worker))
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
}

impl SubscribeResponse {
    fn reply(status: StatusCode, success: bool) -> (StatusCode, Json<Self>) {
        (status, Json(Self { success }))
    }
}

/// GET /push/public-key
#[instrument(skip(admin, state, session))]
pub async fn public_key(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<VapidPublicKey>> {
    let public_key = state.admin_api(&session, &admin).push_public_key().await?;
    Ok(Json(VapidPublicKey { public_key }))
}

/// POST /push/admin/subscribe
///
/// Only accepted while order notifications are switched on for this session.
#[instrument(skip(admin, state, session, subscription))]
pub async fn subscribe(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Json(subscription): Json<PushSubscription>,
) -> (StatusCode, Json<SubscribeResponse>) {
    if !notifications_enabled(&session).await {
        return SubscribeResponse::reply(StatusCode::CONFLICT, false);
    }
    if !subscription.endpoint.starts_with("https://") {
        return SubscribeResponse::reply(StatusCode::BAD_REQUEST, false);
    }

    match state
        .admin_api(&session, &admin)
        .admin_push_subscribe(&subscription)
        .await
    {
        Ok(()) => {
            tracing::info!(admin = admin.display_name(), "Admin push subscription registered");
            SubscribeResponse::reply(StatusCode::OK, true)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Admin push subscription failed");
            SubscribeResponse::reply(StatusCode::BAD_GATEWAY, false)
        }
    }
}

/// GET /sw.js
pub async fn service_worker() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        SERVICE_WORKER_JS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_worker_opens_orders() {
        assert!(SERVICE_WORKER_JS.contains("addEventListener('push'"));
        assert!(SERVICE_WORKER_JS.contains("/orders"));
    }
}
