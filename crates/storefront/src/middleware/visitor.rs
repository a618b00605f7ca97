//! Visitor activity: backend session upkeep and page-view tracking.
//!
//! Runs inside the session layer on every request:
//!
//! 1. If `lastActivity` is older than the idle window, the backend is told
//!    the old session ended and the cached `sessionId` is dropped.
//! 2. `lastActivity` is set to now (milliseconds since the epoch).
//! 3. For full page loads, a backend session is ensured and the page view
//!    is reported in the background.

use axum::{
    extract::{Request, State},
    http::{Method, header},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use jc_closet_client::models::PageView;
use jc_closet_client::{LAST_ACTIVITY_KEY, SESSION_ID_KEY};
use std::time::Duration;
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::state::AppState;

/// Paths that are never page views.
const UNTRACKED_PREFIXES: &[&str] = &[
    "/static",
    "/health",
    "/sw.js",
    "/push",
    "/cart/count",
    "/search/suggest",
    "/favicon",
];

/// Keep the visitor's backend session fresh and record page views.
pub async fn visitor_middleware(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let now = Utc::now();
    expire_idle_session(&state, &session, now).await;

    if let Err(e) = session
        .insert(LAST_ACTIVITY_KEY, now.timestamp_millis())
        .await
    {
        warn!(error = %e, "Failed to record last activity");
    }

    if let Some(view) = page_view(&request) {
        track(&state, &session, view).await;
    }

    next.run(request).await
}

async fn expire_idle_session(state: &AppState, session: &Session, now: DateTime<Utc>) {
    let last = session.get::<i64>(LAST_ACTIVITY_KEY).await.ok().flatten();
    if !last.is_some_and(|ms| is_idle(ms, now, state.config().idle_timeout)) {
        return;
    }

    match session.remove::<String>(SESSION_ID_KEY).await {
        Ok(Some(old)) => {
            debug!("Idle backend session expired");
            let api = state.api().clone();
            tokio::spawn(async move { api.end_session(&old).await });
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to drop idle backend session"),
    }
}

/// Whether a visitor last seen at `last_ms` has been idle longer than `window`.
fn is_idle(last_ms: i64, now: DateTime<Utc>, window: Duration) -> bool {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    now.timestamp_millis().saturating_sub(last_ms) > window_ms
}

/// The page view a request represents, if it is a full HTML page load.
fn page_view(request: &Request) -> Option<PageView> {
    if request.method() != Method::GET || request.headers().contains_key("hx-request") {
        return None;
    }

    let path = request.uri().path();
    if UNTRACKED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return None;
    }

    let wants_html = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"));
    if !wants_html {
        return None;
    }

    let referrer = request
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Some(PageView {
        path: path.to_string(),
        referrer,
    })
}

async fn track(state: &AppState, session: &Session, view: PageView) {
    if let Err(e) = state.api().scope(session).ensure_session().await {
        warn!(error = %e, "Could not start backend session");
        return;
    }

    // A renewal inside the spawned call is not persisted; the next request
    // renews again.
    let api = state.api().clone();
    let session = session.clone();
    tokio::spawn(async move {
        if let Err(e) = api.scope(&session).track_page_view(&view).await {
            debug!(error = %e, path = %view.path, "Page view not recorded");
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use chrono::TimeZone;

    use super::*;

    const THIRTY_MINUTES: Duration = Duration::from_secs(30 * 60);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_idle_window() {
        let now = now();
        let minute = 60_000;
        let ms = now.timestamp_millis();

        assert!(!is_idle(ms - 29 * minute, now, THIRTY_MINUTES));
        assert!(!is_idle(ms - 30 * minute, now, THIRTY_MINUTES));
        assert!(is_idle(ms - 31 * minute, now, THIRTY_MINUTES));
    }

    fn get(path: &str, accept: &str) -> Request {
        Request::builder()
            .uri(path)
            .header(header::ACCEPT, accept)
            .header(header::REFERER, "https://google.com/")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_html_navigation_is_a_page_view() {
        let view = page_view(&get("/shop?page=2", "text/html,application/xhtml+xml")).unwrap();
        assert_eq!(view.path, "/shop");
        assert_eq!(view.referrer.as_deref(), Some("https://google.com/"));
    }

    #[test]
    fn test_assets_fragments_and_posts_are_not_page_views() {
        assert!(page_view(&get("/static/css/main.css", "text/css")).is_none());
        assert!(page_view(&get("/sw.js", "*/*")).is_none());
        assert!(page_view(&get("/cart/count", "text/html")).is_none());

        let mut htmx = get("/shop", "text/html");
        htmx.headers_mut()
            .insert("hx-request", "true".parse().unwrap());
        assert!(page_view(&htmx).is_none());

        let mut post = get("/cart/add", "text/html");
        *post.method_mut() = Method::POST;
        assert!(page_view(&post).is_none());
    }
}
