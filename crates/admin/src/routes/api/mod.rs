//! JSON endpoints used by the console's scripts.

pub mod analytics;
pub mod preferences;
pub mod push;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(analytics::router())
        .merge(preferences::router())
        .merge(push::router())
}
