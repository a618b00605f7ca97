//! Backend session-id storage and the renewal policy.
//!
//! The backend issues an opaque session id from `/session/start` that every
//! later call echoes in `x-session-id`. Where the id lives depends on the
//! caller: the web binaries keep it in the visitor's `tower-sessions` session,
//! the CLI and tests keep it in memory.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Session key holding the backend session id.
pub const SESSION_ID_KEY: &str = "sessionId";

/// Session key holding the time of the visitor's last request.
pub const LAST_ACTIVITY_KEY: &str = "lastActivity";

/// Storage for the backend session id.
///
/// Storage failures are not surfaced: a lost id only costs a renewal.
pub trait SessionCache: Send + Sync {
    /// The cached id, if any.
    fn get(&self) -> impl Future<Output = Option<String>> + Send;

    /// Replace the cached id.
    fn set(&self, id: String) -> impl Future<Output = ()> + Send;

    /// Forget the cached id.
    fn clear(&self) -> impl Future<Output = ()> + Send;
}

impl SessionCache for tower_sessions::Session {
    async fn get(&self) -> Option<String> {
        match tower_sessions::Session::get::<String>(self, SESSION_ID_KEY).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read backend session id");
                None
            }
        }
    }

    async fn set(&self, id: String) {
        if let Err(e) = self.insert(SESSION_ID_KEY, id).await {
            tracing::warn!(error = %e, "Failed to store backend session id");
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.remove::<String>(SESSION_ID_KEY).await {
            tracing::warn!(error = %e, "Failed to clear backend session id");
        }
    }
}

/// In-process session-id cache.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionCache {
    id: Arc<RwLock<Option<String>>>,
}

impl MemorySessionCache {
    /// Create a cache pre-seeded with an id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Arc::new(RwLock::new(Some(id.into()))),
        }
    }
}

impl SessionCache for MemorySessionCache {
    async fn get(&self) -> Option<String> {
        self.id.read().await.clone()
    }

    async fn set(&self, id: String) {
        *self.id.write().await = Some(id);
    }

    async fn clear(&self) {
        *self.id.write().await = None;
    }
}

/// A cache that never holds an id. Calls go out without `x-session-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

impl SessionCache for NoSession {
    async fn get(&self) -> Option<String> {
        None
    }

    async fn set(&self, _id: String) {}

    async fn clear(&self) {}
}

/// How many times a single call may renew an expired session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_session_renewals: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_session_renewals: 1,
        }
    }
}

impl RetryPolicy {
    /// Never renew; a session-expired response fails immediately.
    pub const NONE: Self = Self {
        max_session_renewals: 0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cache_set_and_clear() {
        let cache = MemorySessionCache::default();
        assert_eq!(cache.get().await, None);

        cache.set("abc".to_string()).await;
        assert_eq!(cache.get().await.as_deref(), Some("abc"));

        let shared = cache.clone();
        shared.clear().await;
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn test_tower_session_cache_uses_session_id_key() {
        use tower_sessions::{MemoryStore, Session};

        let store = Arc::new(MemoryStore::default());
        let session = Session::new(None, store, None);

        SessionCache::set(&session, "s-1".to_string()).await;
        let raw: Option<String> = session.get(SESSION_ID_KEY).await.unwrap_or_default();
        assert_eq!(raw.as_deref(), Some("s-1"));

        SessionCache::clear(&session).await;
        assert_eq!(SessionCache::get(&session).await, None);
    }
}
