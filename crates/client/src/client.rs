//! The request helper every backend call goes through.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::models::SessionStarted;
use crate::session::{RetryPolicy, SessionCache};

/// Header carrying the backend session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Empty query string for cached GETs.
pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

/// Non-standard status some backends use for an expired login session.
const LOGIN_TIMEOUT: u16 = 440;

/// Percent-encode a caller-supplied id as a single path segment.
///
/// Slashes, `?` and `#` are escaped so an id can never leave its endpoint.
/// Empty and dot-only ids would be resolved as relative segments, so they
/// are refused as `NotFound` before any request is sent.
pub(crate) fn segment(id: &str) -> ApiResult<String> {
    if id.is_empty() || id.bytes().all(|b| b == b'.') {
        return Err(ApiError::NotFound(format!("invalid id {id:?}")));
    }
    let mut scratch = Url::parse("http://backend.invalid/")?;
    if let Ok(mut segments) = scratch.path_segments_mut() {
        segments.clear().push(id);
    }
    Ok(scratch.path().trim_start_matches('/').to_string())
}

/// Settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Backend base URL, e.g. `https://api.jccloset.com/api`.
    pub base_url: String,
    pub timeout: Duration,
    /// TTL of cached catalogue and content responses.
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
    pub retry: RetryPolicy,
}

impl ApiClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(15),
            cache_ttl: Duration::from_secs(60),
            cache_capacity: 1000,
            retry: RetryPolicy::default(),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Shared backend client. Cheap to clone.
///
/// Per-visitor state (the session id, an admin bearer token) is not held
/// here; bind it per request with [`ApiClient::scope`].
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    cache: Cache<String, Arc<serde_json::Value>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the base URL does not parse, or `Http` if the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiClientConfig) -> ApiResult<Self> {
        Url::parse(&config.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("jc-closet/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                retry: config.retry,
                cache,
            }),
        })
    }

    /// The configured base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{path}", self.inner.base_url))?)
    }

    /// Bind a session-id cache (and optionally a bearer token) for a call.
    #[must_use]
    pub const fn scope<'a, S: SessionCache>(&'a self, session: &'a S) -> ApiContext<'a, S> {
        ApiContext {
            client: self,
            session,
            token: None,
        }
    }

    /// Ask the backend for a new session id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply has no id.
    #[instrument(skip(self))]
    pub async fn start_session(&self) -> ApiResult<String> {
        let response = self
            .inner
            .http
            .post(self.url("/session/start")?)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let status = response.status();
        let retry_after = retry_after(&response);
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, extract_message(&text), retry_after));
        }
        let started: SessionStarted = decode(&text)?;
        debug!("Started backend session");
        Ok(started.session_id)
    }

    /// Tell the backend a session is over. Failures are only logged.
    #[instrument(skip(self, session_id))]
    pub async fn end_session(&self, session_id: &str) {
        let Ok(url) = self.url("/session/end") else {
            return;
        };
        let result = self
            .inner
            .http
            .post(url)
            .header(SESSION_HEADER, session_id)
            .json(&serde_json::json!({ "sessionId": session_id }))
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => debug!("Ended backend session"),
            Ok(response) => warn!(status = %response.status(), "Backend refused session end"),
            Err(e) => warn!(error = %e, "Failed to end backend session"),
        }
    }

    /// Drop every cached response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }
}

// =============================================================================
// ApiContext
// =============================================================================

/// A client bound to one visitor's session id and credentials.
pub struct ApiContext<'a, S> {
    client: &'a ApiClient,
    session: &'a S,
    token: Option<&'a SecretString>,
}

impl<S> std::fmt::Debug for ApiContext<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContext")
            .field("client", self.client)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

/// What a response means for the retry loop.
enum Reply {
    Body(String),
    Expired(StatusCode),
    Failed(ApiError),
}

impl<'a, S: SessionCache> ApiContext<'a, S> {
    /// Send `Authorization: Bearer <token>` with every call.
    #[must_use]
    pub fn with_token(mut self, token: Option<&'a SecretString>) -> Self {
        self.token = token;
        self
    }

    /// The underlying shared client.
    #[must_use]
    pub const fn client(&self) -> &'a ApiClient {
        self.client
    }

    /// The cached session id, starting a backend session if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if a new session cannot be started.
    pub async fn ensure_session(&self) -> ApiResult<String> {
        if let Some(id) = self.session.get().await {
            return Ok(id);
        }
        let id = self.client.start_session().await?;
        self.session.set(id.clone()).await;
        Ok(id)
    }

    /// Discard the cached id and start a fresh backend session.
    async fn renew_session(&self) -> ApiResult<()> {
        self.session.clear().await;
        let id = self.client.start_session().await?;
        self.session.set(id).await;
        Ok(())
    }

    /// Run one logical call, renewing the session and retrying per the
    /// client's [`RetryPolicy`] when the backend reports it expired.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    async fn execute<T, F>(&self, method: Method, path: &str, renew: bool, build: F) -> ApiResult<T>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
    {
        let url = self.client.url(path)?;
        let policy = self.client.inner.retry;
        let mut renewals = 0u32;

        loop {
            let mut request = build(self.client.inner.http.request(method.clone(), url.clone()));
            if let Some(id) = self.session.get().await {
                request = request.header(SESSION_HEADER, id);
            }
            if let Some(token) = self.token {
                request = request.bearer_auth(token.expose_secret());
            }

            match read_reply(request.send().await?).await? {
                Reply::Body(text) => return decode(&text),
                Reply::Failed(e) => return Err(e),
                Reply::Expired(status) if !renew => {
                    return Err(if status == StatusCode::UNAUTHORIZED {
                        ApiError::Unauthorized
                    } else {
                        ApiError::SessionExpired
                    });
                }
                Reply::Expired(status) => {
                    if renewals >= policy.max_session_renewals {
                        // A fresh session did not help, so the bearer token is what the
                        // backend refuses.
                        if status == StatusCode::UNAUTHORIZED && self.token.is_some() {
                            warn!(renewals, "Bearer token rejected after session renewal");
                            return Err(ApiError::Unauthorized);
                        }
                        warn!(%status, renewals, "Session still expired after renewal");
                        return Err(ApiError::SessionExpired);
                    }
                    renewals += 1;
                    debug!(%status, "Backend session expired, renewing");
                    self.renew_session().await?;
                }
            }
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(Method::GET, path, true, |r| r).await
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + Sync + ?Sized,
    {
        self.execute(Method::GET, path, true, |r| r.query(query))
            .await
    }

    pub(crate) async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.execute(method, path, true, |r| r.json(body)).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.send_json(Method::POST, path, body).await
    }

    /// POST without session renewal; a 401 is a plain `Unauthorized`.
    pub(crate) async fn post_once<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.execute(Method::POST, path, false, |r| r.json(body))
            .await
    }

    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        self.execute::<IgnoredAny, _>(Method::DELETE, path, true, |r| r)
            .await
            .map(|_| ())
    }

    /// POST where only success matters; whatever body comes back is skipped.
    pub(crate) async fn post_ack<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.post::<IgnoredAny, B>(path, body).await.map(|_| ())
    }

    /// GET through the shared response cache.
    pub(crate) async fn get_cached<T, Q>(&self, key: String, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + Sync + ?Sized,
    {
        if let Some(value) = self.client.inner.cache.get(&key).await {
            debug!(%key, "Cache hit");
            return Ok(T::deserialize(&*value)?);
        }

        let value: serde_json::Value = self.get_query(path, query).await?;
        let typed = T::deserialize(&value)?;
        self.client.inner.cache.insert(key, Arc::new(value)).await;
        Ok(typed)
    }
}

// =============================================================================
// Response handling
// =============================================================================

async fn read_reply(response: reqwest::Response) -> ApiResult<Reply> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status.as_u16() == LOGIN_TIMEOUT {
        return Ok(Reply::Expired(status));
    }

    let retry_after = retry_after(&response);
    let text = response.text().await?;

    if signals_session_expired(&text) {
        return Ok(Reply::Expired(status));
    }

    if status.is_success() {
        return Ok(Reply::Body(text));
    }

    warn!(
        %status,
        body = %text.chars().take(500).collect::<String>(),
        "Backend returned non-success status"
    );
    Ok(Reply::Failed(ApiError::from_status(
        status,
        extract_message(&text),
        retry_after,
    )))
}

fn retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
}

fn decode<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    let body = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        ApiError::Parse(e)
    })
}

/// Whether a JSON body says the session expired (in `error` or `message`).
pub(crate) fn signals_session_expired(text: &str) -> bool {
    let Ok(serde_json::Value::Object(body)) = serde_json::from_str::<serde_json::Value>(text)
    else {
        return false;
    };
    ["error", "message"].iter().any(|field| {
        body.get(*field)
            .and_then(serde_json::Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains("session expired"))
    })
}

/// Best human-readable message from an error body.
pub(crate) fn extract_message(text: &str) -> String {
    if let Ok(serde_json::Value::Object(body)) = serde_json::from_str::<serde_json::Value>(text) {
        for field in ["message", "error"] {
            if let Some(message) = body.get(field).and_then(serde_json::Value::as_str) {
                return message.to_string();
            }
        }
    }
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_detection() {
        assert!(signals_session_expired(r#"{"error": "Session expired"}"#));
        assert!(signals_session_expired(r#"{"message": "Your SESSION EXPIRED, start again"}"#));
        assert!(!signals_session_expired(r#"{"error": "Not found"}"#));
        assert!(!signals_session_expired(r#"{"error": {"code": "session expired"}}"#));
        assert!(!signals_session_expired("session expired"));
        assert!(!signals_session_expired(""));
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(extract_message(r#"{"message": "Email taken"}"#), "Email taken");
        assert_eq!(extract_message(r#"{"error": "Bad date"}"#), "Bad date");
        assert_eq!(extract_message("plain text"), "plain text");
        assert_eq!(extract_message(&"x".repeat(300)).len(), 200);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = ApiClientConfig::new("not a url");
        assert!(matches!(ApiClient::new(&config), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_join() {
        let client = ApiClient::new(&ApiClientConfig::new("https://api.example.com/api/"))
            .unwrap_or_else(|e| panic!("client: {e}"));
        let url = client.url("/perfumes").map(|u| u.to_string()).unwrap_or_default();
        assert_eq!(url, "https://api.example.com/api/perfumes");
    }

    #[test]
    fn test_segment_escapes_path_syntax() {
        let encoded = segment("../admin/customers?limit=1000#x").unwrap_or_default();
        assert_eq!(encoded, "..%2Fadmin%2Fcustomers%3Flimit=1000%23x");
        assert_eq!(segment("p-1_a").unwrap_or_default(), "p-1_a");
        assert!(matches!(segment(".."), Err(ApiError::NotFound(_))));
        assert!(matches!(segment(""), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_decode_empty_body_as_unit() {
        let unit: ApiResult<()> = decode("");
        assert!(unit.is_ok());
    }

    #[test]
    fn test_acknowledgement_bodies_are_skipped() {
        assert!(decode::<IgnoredAny>(r#"{"message":"Subscribed"}"#).is_ok());
        assert!(decode::<IgnoredAny>("").is_ok());
        assert!(decode::<()>(r#"{"message":"Subscribed"}"#).is_err());
    }
}
