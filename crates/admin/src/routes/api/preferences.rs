//! Per-session console preferences.

use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::session::set_notifications;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/preferences/notifications", post(notifications))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub enabled: bool,
}

/// POST /preferences/notifications
///
/// # Errors
///
/// Returns 500 if the session can't be written.
pub async fn notifications(
    RequireAdminAuth(admin): RequireAdminAuth,
    session: Session,
    Json(prefs): Json<NotificationPrefs>,
) -> Result<Json<NotificationPrefs>> {
    set_notifications(&session, prefs.enabled).await?;
    tracing::info!(admin = admin.display_name(), enabled = prefs.enabled, "Order notifications toggled");
    Ok(Json(prefs))
}
