//! Appointment booking.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, NaiveTime, Utc};
use jc_closet_client::ApiError;
use jc_closet_client::models::NewAppointment;
use jc_closet_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::AnalyticsConfig;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Services that can be booked.
pub const SERVICES: [&str; 3] = ["Fragrance consultation", "Personal styling", "Fitting"];

/// Booking form data, kept as strings so the form can be re-rendered as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub notes: String,
}

fn optional(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl BookingForm {
    /// Validate against `today`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first problem.
    pub fn validate(&self, today: NaiveDate) -> Result<NewAppointment, String> {
        let name = optional(&self.name).ok_or_else(|| "Please enter your name.".to_string())?;
        let email =
            Email::parse(&self.email).map_err(|_| "Please enter a valid email address.".to_string())?;
        let service = SERVICES
            .iter()
            .find(|s| **s == self.service.trim())
            .ok_or_else(|| "Please choose a service.".to_string())?;
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "Please choose a date.".to_string())?;
        if date < today {
            return Err("Please choose a date in the future.".to_string());
        }
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|_| "Please choose a time.".to_string())?;

        Ok(NewAppointment {
            name,
            email: email.into_inner(),
            phone: optional(&self.phone),
            service: (*service).to_string(),
            date,
            time: time.format("%H:%M").to_string(),
            notes: optional(&self.notes),
        })
    }
}

/// Service dropdown option.
pub struct ServiceOption {
    pub name: &'static str,
    pub selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "appointments/form.html")]
pub struct BookingTemplate {
    pub services: Vec<ServiceOption>,
    pub form: BookingForm,
    /// Earliest selectable date, `YYYY-MM-DD`.
    pub min_date: String,
    pub error: Option<String>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "appointments/booked.html")]
pub struct BookedTemplate {
    pub name: String,
    pub service: String,
    /// e.g. "Monday 2 November 2026 at 14:30".
    pub when: String,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

fn booking_page(
    state: &AppState,
    form: BookingForm,
    error: Option<String>,
    nonce: String,
) -> BookingTemplate {
    let chosen = form.service.trim();
    BookingTemplate {
        services: SERVICES
            .iter()
            .map(|&name| ServiceOption {
                name,
                selected: name == chosen,
            })
            .collect(),
        form,
        min_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        error,
        analytics: state.config().analytics.clone(),
        nonce,
    }
}

/// Booking form.
#[instrument(skip(state, nonce))]
pub async fn form(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> BookingTemplate {
    booking_page(&state, BookingForm::default(), None, nonce)
}

/// Book an appointment.
#[instrument(skip(state, session, nonce, form))]
pub async fn book(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<BookingForm>,
) -> Response {
    let booking = match form.validate(Utc::now().date_naive()) {
        Ok(booking) => booking,
        Err(message) => return booking_page(&state, form, Some(message), nonce).into_response(),
    };

    add_breadcrumb("appointments", "Booking", &[("service", &booking.service)]);

    match state.api().scope(&session).book_appointment(&booking).await {
        Ok(appointment) => {
            tracing::info!(appointment_id = %appointment.id, "Appointment booked");
            BookedTemplate {
                name: appointment.name,
                service: appointment.service,
                when: format!("{} at {}", appointment.date.format("%A %-d %B %Y"), appointment.time),
                analytics: state.config().analytics.clone(),
                nonce,
            }
            .into_response()
        }
        Err(ApiError::Validation(message)) => {
            booking_page(&state, form, Some(message), nonce).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Appointment booking failed");
            booking_page(
                &state,
                form,
                Some("We couldn't book your appointment. Please try again.".to_string()),
                nonce,
            )
            .into_response()
        }
    }
}
