//! End-to-end harness for JC Closet.
//!
//! Each test starts an in-process mock of the backend REST API, then runs the
//! real storefront or admin router against it on a loopback port. Sessions
//! live in a `MemoryStore` and the `PostgreSQL` pool is lazy, so no database
//! is needed.
//!
//! ```rust,ignore
//! let backend = Recorder::default();
//! let api = spawn(Router::new().route("/perfumes/{id}", get(perfume)).with_state(backend)).await;
//! let shop = spawn_storefront(&api).await;
//! let resp = browser().get(format!("{shop}/cart")).send().await?;
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::http::HeaderMap;
use jc_closet_client::SESSION_HEADER;
use jc_closet_core::CurrencyCode;
use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_sessions::MemoryStore;

/// Client address sent with every request; the rate limiters key on it.
pub const CLIENT_IP: &str = "203.0.113.7";

/// One request seen by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub path: String,
    pub session: Option<String>,
    pub bearer: Option<String>,
}

/// Shared log of backend calls, used as mock router state.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    /// Log a call and return it.
    pub fn record(&self, path: &str, headers: &HeaderMap) -> Call {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let call = Call {
            path: path.to_string(),
            session: header(SESSION_HEADER),
            bearer: header("authorization")
                .and_then(|v| v.strip_prefix("Bearer ").map(str::to_string)),
        };
        self.calls.lock().unwrap().push(call.clone());
        call
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made to `path`.
    #[must_use]
    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.path == path)
            .collect()
    }
}

/// Serve `app` on a loopback port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A pool that never connects unless a query runs.
#[must_use]
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://jc:jc@127.0.0.1:1/jc_test")
        .expect("lazy pool URL parses")
}

fn test_secret() -> SecretString {
    SecretString::from("k3Jx9Qm2Lr7Vw4Zt8Np1Hs6Fd0Gy5Bc3Ea2Ru9Ti7Ow4")
}

/// Storefront configuration pointing at the mock backend `api`.
#[must_use]
pub fn storefront_config(api: &str) -> jc_closet_storefront::config::StorefrontConfig {
    use jc_closet_storefront::config::{AnalyticsConfig, ApiConfig, SentryConfig, StorefrontConfig};

    StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost".to_string(),
        session_secret: test_secret(),
        api: ApiConfig {
            base_url: api.to_string(),
            timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(60),
        },
        idle_timeout: Duration::from_secs(30 * 60),
        currency: CurrencyCode::KES,
        analytics: AnalyticsConfig::default(),
        sentry: SentryConfig::default(),
    }
}

/// Admin configuration pointing at the mock backend `api`.
#[must_use]
pub fn admin_config(api: &str) -> jc_closet_admin::config::AdminConfig {
    use jc_closet_admin::config::{AdminConfig, ApiConfig, SentryConfig};

    AdminConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost".to_string(),
        session_secret: test_secret(),
        api: ApiConfig {
            base_url: api.to_string(),
            timeout: Duration::from_secs(5),
        },
        currency: CurrencyCode::KES,
        sentry: SentryConfig::default(),
        tls: None,
    }
}

/// Start the storefront against the mock backend `api`.
pub async fn spawn_storefront(api: &str) -> String {
    use jc_closet_storefront::{middleware::session, routes, state::AppState};

    let state = AppState::new(storefront_config(api), lazy_pool()).unwrap();
    let app = routes::app(state).layer(session::configure(MemoryStore::default(), false));
    spawn(app).await
}

/// Start the admin console against the mock backend `api`.
pub async fn spawn_admin(api: &str) -> String {
    use jc_closet_admin::{middleware::session, routes, state::AppState};

    let state = AppState::new(admin_config(api), lazy_pool()).unwrap();
    let app = routes::app(state).layer(session::configure(MemoryStore::default(), false));
    spawn(app).await
}

/// A cookie-keeping client that does not follow redirects.
#[must_use]
pub fn browser() -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        reqwest::header::HeaderValue::from_static(CLIENT_IP),
    );
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .default_headers(headers)
        .build()
        .expect("test client builds")
}
