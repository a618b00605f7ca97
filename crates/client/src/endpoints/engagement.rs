use tracing::instrument;

use crate::client::ApiContext;
use crate::error::ApiResult;
use crate::models::{Appointment, ContactMessage, NewAppointment, PushSubscription, VapidPublicKey};
use crate::session::SessionCache;

impl<S: SessionCache> ApiContext<'_, S> {
    /// Book an appointment.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the slot is unavailable or the input is
    /// rejected, or another error if the API request fails.
    #[instrument(skip(self, booking), fields(date = %booking.date, time = %booking.time))]
    pub async fn book_appointment(&self, booking: &NewAppointment) -> ApiResult<Appointment> {
        self.post("/appointments", booking).await
    }

    /// Send a contact-form message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, message))]
    pub async fn send_contact(&self, message: &ContactMessage) -> ApiResult<()> {
        self.post_ack("/contact", message).await
    }

    /// Subscribe an email to the newsletter.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an address the backend rejects, or another
    /// error if the API request fails.
    #[instrument(skip(self, email))]
    pub async fn subscribe_newsletter(&self, email: &str) -> ApiResult<()> {
        self.post_ack(
            "/newsletter/subscribe",
            &serde_json::json!({ "email": email }),
        )
        .await
    }

    /// The VAPID public key browsers subscribe with.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn push_public_key(&self) -> ApiResult<String> {
        let key: VapidPublicKey = self.get("/push/public-key").await?;
        Ok(key.public_key)
    }

    /// Register a browser push subscription for shopper notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, subscription))]
    pub async fn push_subscribe(&self, subscription: &PushSubscription) -> ApiResult<()> {
        self.post_ack("/push/subscribe", subscription).await
    }
}
