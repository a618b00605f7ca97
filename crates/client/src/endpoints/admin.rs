use jc_closet_core::{AppointmentId, AppointmentStatus, ProductId, PromoTerms};
use reqwest::Method;
use tracing::instrument;

use crate::client::{ApiContext, segment};
use crate::error::ApiResult;
use crate::models::{AdminStats, Appointment, Perfume, PushSubscription, Subscriber};
use crate::session::SessionCache;

impl<S: SessionCache> ApiContext<'_, S> {
    /// Dashboard figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_stats(&self) -> ApiResult<AdminStats> {
        self.get("/admin/stats").await
    }

    /// Replace a product's promotion terms and drop cached catalogue pages.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the backend rejects the terms, or another error
    /// if the API request fails.
    #[instrument(skip(self, terms), fields(id = %id))]
    pub async fn admin_update_promo(&self, id: &ProductId, terms: &PromoTerms) -> ApiResult<Perfume> {
        let perfume = self
            .send_json(
                Method::PATCH,
                &format!("/admin/perfumes/{}/promo", segment(id.as_str())?),
                terms,
            )
            .await?;
        self.client().invalidate_cache();
        Ok(perfume)
    }

    /// All bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_list_appointments(&self) -> ApiResult<Vec<Appointment>> {
        self.get("/admin/appointments").await
    }

    /// Confirm, complete or cancel a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(id = %id, status = status.as_str()))]
    pub async fn admin_update_appointment_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> ApiResult<Appointment> {
        self.send_json(
            Method::PATCH,
            &format!("/admin/appointments/{}/status", segment(id.as_str())?),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    /// Newsletter subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_list_subscribers(&self) -> ApiResult<Vec<Subscriber>> {
        self.get("/admin/newsletter/subscribers").await
    }

    /// Register a browser for new-order notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, subscription))]
    pub async fn admin_push_subscribe(&self, subscription: &PushSubscription) -> ApiResult<()> {
        self.post_ack("/push/admin/subscribe", subscription).await
    }
}
