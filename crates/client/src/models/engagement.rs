//! Appointments, contact messages, newsletter and web push.

use chrono::{DateTime, NaiveDate, Utc};
use jc_closet_core::{AppointmentId, AppointmentStatus};
use serde::{Deserialize, Serialize};

// =============================================================================
// Appointments
// =============================================================================

/// A fitting or fragrance consultation booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id", alias = "id")]
    pub id: AppointmentId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub service: String,
    pub date: NaiveDate,
    /// Slot start, `HH:MM`.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Booking payload for `POST /appointments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub service: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Contact & newsletter
// =============================================================================

/// Payload for `POST /contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

/// A newsletter subscriber as listed for admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub email: String,
    #[serde(default = "active_default")]
    pub active: bool,
    #[serde(default)]
    pub subscribed_at: Option<DateTime<Utc>>,
}

const fn active_default() -> bool {
    true
}

// =============================================================================
// Web push
// =============================================================================

/// Keys of a browser `PushSubscription`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser `PushSubscription`, as produced by `subscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<i64>,
    pub keys: PushKeys,
}

/// Backend reply to `GET /push/public-key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidPublicKey {
    #[serde(alias = "key")]
    pub public_key: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_push_subscription_from_browser_json() {
        let json = r#"{
            "endpoint": "https://fcm.googleapis.com/fcm/send/abc",
            "expirationTime": null,
            "keys": {"p256dh": "BNc...", "auth": "tBH..."}
        }"#;
        let sub: PushSubscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.keys.auth, "tBH...");
        assert!(sub.expiration_time.is_none());
    }

    #[test]
    fn test_appointment_status_defaults_to_pending() {
        let json = r#"{"_id": "ap1", "name": "Ian", "email": "ian@example.com", "date": "2026-11-02", "time": "14:30"}"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert_eq!(appt.date, NaiveDate::from_ymd_opt(2026, 11, 2).unwrap());
    }
}
