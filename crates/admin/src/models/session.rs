//! Session-stored admin identity.
//!
//! The login response is split across flat session keys (`token`, `role`)
//! rather than one serialized struct so the session table reads the same
//! way the backend's own tooling expects.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use jc_closet_client::models::LoginResponse;

/// Session keys for admin authentication data.
pub mod keys {
    pub use jc_closet_client::SESSION_ID_KEY;

    /// Backend bearer token.
    pub const TOKEN: &str = "token";

    /// Backend role string, e.g. `admin`.
    pub const ROLE: &str = "role";

    /// Display name and email from the login response.
    pub const PROFILE: &str = "adminProfile";

    /// Whether this admin wants order notifications.
    pub const NOTIFICATIONS: &str = "jc_closet_admin_notif";
}

/// Role the backend grants console users.
pub const ADMIN_ROLE: &str = "admin";

/// Who is signed in, as far as the login response told us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// The signed-in admin, rebuilt from the session on every request.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub token: SecretString,
    pub role: String,
    pub profile: AdminProfile,
}

impl CurrentAdmin {
    /// Whether the role may use the console.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        is_admin_role(&self.role)
    }

    /// Name to show in the header.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.profile
            .name
            .as_deref()
            .or(self.profile.email.as_deref())
            .unwrap_or("Admin")
    }
}

/// Role check shared by login and the auth extractor.
#[must_use]
pub fn is_admin_role(role: &str) -> bool {
    role.trim().eq_ignore_ascii_case(ADMIN_ROLE)
}

/// Read the current admin, if a complete login is stored.
pub async fn current_admin(session: &Session) -> Option<CurrentAdmin> {
    let token: String = session.get(keys::TOKEN).await.ok().flatten()?;
    let role: String = session.get(keys::ROLE).await.ok().flatten()?;
    let profile: AdminProfile = session
        .get(keys::PROFILE)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    Some(CurrentAdmin {
        token: SecretString::from(token),
        role,
        profile,
    })
}

/// Store a successful login.
///
/// The session id is cycled first so a pre-login cookie can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    login: &LoginResponse,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::TOKEN, &login.token).await?;
    session.insert(keys::ROLE, &login.role).await?;
    session
        .insert(
            keys::PROFILE,
            AdminProfile {
                name: login.name.clone(),
                email: login.email.clone(),
            },
        )
        .await
}

/// Forget the login (logout). The backend session id and the notification
/// preference go with it.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Whether order notifications are switched on.
pub async fn notifications_enabled(session: &Session) -> bool {
    session
        .get::<bool>(keys::NOTIFICATIONS)
        .await
        .ok()
        .flatten()
        .unwrap_or(false)
}

/// Switch order notifications on or off.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_notifications(
    session: &Session,
    enabled: bool,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::NOTIFICATIONS, enabled).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::ExposeSecret;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn login(role: &str) -> LoginResponse {
        LoginResponse {
            token: "tok_abc".to_string(),
            role: role.to_string(),
            name: Some("Jane".to_string()),
            email: Some("jane@jccloset.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let session = session();
        assert!(current_admin(&session).await.is_none());

        set_current_admin(&session, &login("admin")).await.unwrap();
        let admin = current_admin(&session).await.unwrap();

        assert_eq!(admin.token.expose_secret(), "tok_abc");
        assert!(admin.is_admin());
        assert_eq!(admin.display_name(), "Jane");
        assert_eq!(
            session.get::<String>(keys::TOKEN).await.unwrap().as_deref(),
            Some("tok_abc")
        );

        clear_current_admin(&session).await.unwrap();
        assert!(current_admin(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_notification_preference_defaults_off() {
        let session = session();
        assert!(!notifications_enabled(&session).await);
        set_notifications(&session, true).await.unwrap();
        assert!(notifications_enabled(&session).await);
    }

    #[test]
    fn test_role_check() {
        assert!(is_admin_role("admin"));
        assert!(is_admin_role(" Admin "));
        assert!(!is_admin_role("customer"));
        assert!(!is_admin_role(""));
    }
}
