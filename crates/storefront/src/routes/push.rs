//! Web push: VAPID key, subscription forwarding and the service worker.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use jc_closet_client::models::{PushSubscription, VapidPublicKey};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// The service worker script, served from the site root so it controls `/`.
const SERVICE_WORKER_JS: &str = include_str!("../../static/sw.js");

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
}

/// The backend's VAPID public key.
///
/// # Errors
///
/// Returns 502 if the backend can't be reached.
#[instrument(skip(state, session))]
pub async fn public_key(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<VapidPublicKey>> {
    let public_key = state.api().scope(&session).push_public_key().await?;
    Ok(Json(VapidPublicKey { public_key }))
}

/// Forward a browser push subscription to the backend.
#[instrument(skip(state, session, subscription))]
pub async fn subscribe(
    State(state): State<AppState>,
    session: Session,
    Json(subscription): Json<PushSubscription>,
) -> (StatusCode, Json<SubscribeResponse>) {
    if !subscription.endpoint.starts_with("https://") {
        return (
            StatusCode::BAD_REQUEST,
            Json(SubscribeResponse { success: false }),
        );
    }

    match state.api().scope(&session).push_subscribe(&subscription).await {
        Ok(()) => {
            tracing::info!("Push subscription registered");
            (StatusCode::OK, Json(SubscribeResponse { success: true }))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Push subscription failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(SubscribeResponse { success: false }),
            )
        }
    }
}

/// `GET /sw.js`
pub async fn service_worker() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::HeaderName::from_static("service-worker-allowed"), "/"),
        ],
        SERVICE_WORKER_JS,
    )
}
