//! Typed projections of backend resources.
//!
//! Field names follow the backend's camelCase JSON; ids arrive as `_id`.
//! Optional fields default so that a sparse record still renders.

pub mod analytics;
pub mod catalogue;
pub mod content;
pub mod engagement;
pub mod orders;

pub use analytics::*;
pub use catalogue::*;
pub use content::*;
pub use engagement::*;
pub use orders::*;

use serde::{Deserialize, Serialize};

/// Backend reply to `/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Backend reply to `/session/start`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionStarted {
    #[serde(rename = "sessionId", alias = "session_id", alias = "id")]
    pub session_id: String,
}
