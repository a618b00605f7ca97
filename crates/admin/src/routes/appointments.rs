//! Appointment bookings.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Redirect, Response},
    routing::{get, post},
};
use jc_closet_client::models::Appointment;
use jc_closet_core::{AppointmentId, AppointmentStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminUserView;
use crate::models::views::{StatusOption, appointment_class};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AppointmentRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub notes: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub statuses: Vec<StatusOption>,
}

impl From<&Appointment> for AppointmentRow {
    fn from(appt: &Appointment) -> Self {
        Self {
            id: appt.id.to_string(),
            name: appt.name.clone(),
            email: appt.email.clone(),
            phone: appt.phone.clone().unwrap_or_default(),
            service: appt.service.clone(),
            date: appt.date.format("%a %-d %b %Y").to_string(),
            time: appt.time.clone(),
            notes: appt.notes.clone().unwrap_or_default(),
            status: appt.status.label(),
            status_class: appointment_class(appt.status),
            statuses: StatusOption::appointments(appt.status),
        }
    }
}

/// Soonest first; optionally only one status.
fn schedule(mut appointments: Vec<Appointment>, only: Option<AppointmentStatus>) -> Vec<AppointmentRow> {
    appointments.retain(|appt| only.is_none_or(|status| appt.status == status));
    appointments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
    appointments.iter().map(AppointmentRow::from).collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentsQuery {
    pub status: Option<String>,
    pub updated: Option<String>,
}

#[derive(Template)]
#[template(path = "appointments/index.html")]
pub struct AppointmentsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub appointments: Vec<AppointmentRow>,
    /// Filter tabs; none selected means all.
    pub tabs: Vec<StatusOption>,
    pub filtered: bool,
    pub updated: bool,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(index))
        .route("/appointments/{id}/status", post(update_status))
}

/// GET /appointments
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<AppointmentsQuery>,
) -> Response {
    let only = query.status.as_deref().and_then(AppointmentStatus::parse);
    let (appointments, error) = match state
        .admin_api(&session, &admin)
        .admin_list_appointments()
        .await
    {
        Ok(list) => (schedule(list, only), None),
        Err(e) => {
            tracing::error!("Failed to fetch appointments: {e}");
            (
                Vec::new(),
                Some("Appointments could not be loaded.".to_string()),
            )
        }
    };

    let tabs = StatusOption::appointments(only.unwrap_or(AppointmentStatus::Unknown));

    super::render(&AppointmentsTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/appointments".to_string(),
        appointments,
        tabs,
        filtered: only.is_some(),
        updated: query.updated.is_some(),
        error,
    })
}

/// POST /appointments/{id}/status
#[instrument(skip(admin, state, session, form))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let status = AppointmentStatus::parse(form.status.trim()).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown appointment status: {}", form.status))
    })?;
    let appointment_id = AppointmentId::new(id);

    state
        .admin_api(&session, &admin)
        .admin_update_appointment_status(&appointment_id, status)
        .await?;

    tracing::info!(
        appointment_id = %appointment_id,
        status = status.as_str(),
        "Appointment status updated"
    );
    Ok(Redirect::to("/appointments?updated=1"))
}
