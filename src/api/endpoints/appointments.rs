//! Booking-engine endpoints: create, list, detail, and transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::booking::{self, BookingRequest};
use crate::db::repository;
use crate::error::BookingError;
use crate::identity::{ActingIdentity, Role};
use crate::models::Appointment;

#[derive(Deserialize)]
pub struct BookPayload {
    pub doctor_id: Uuid,
    /// Required for administrators booking on a patient's behalf;
    /// patients book for themselves.
    pub patient_id: Option<Uuid>,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_video: bool,
}

fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

/// Resolve which patient the booking is for. The engine re-validates
/// ownership; this only picks the target row.
fn resolve_patient_id(
    conn: &Connection,
    actor: &ActingIdentity,
    explicit: Option<Uuid>,
) -> Result<Uuid, ApiError> {
    if let Some(id) = explicit {
        return Ok(id);
    }
    match actor.role {
        Role::Admin => Err(ApiError::BadRequest(
            "patient_id is required for administrator bookings".into(),
        )),
        Role::Doctor => Err(ApiError::Domain(BookingError::Forbidden)),
        Role::Patient => {
            let patient = repository::get_patient_by_user(conn, &actor.user_id)
                .map_err(ApiError::from)?
                .ok_or(ApiError::Domain(BookingError::not_found(
                    "Patient",
                    actor.user_id,
                )))?;
            Ok(patient.id)
        }
    }
}

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub appointment: Appointment,
}

/// `POST /api/appointments` — book a slot.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Json(payload): Json<BookPayload>,
) -> Result<(StatusCode, Json<AppointmentResponse>), ApiError> {
    let date = parse_date(&payload.date)?;
    let mut conn = ctx.state.open_db()?;
    let patient_id = resolve_patient_id(&conn, &actor, payload.patient_id)?;

    let appointment = booking::create(
        &mut conn,
        &actor,
        &BookingRequest {
            doctor_id: payload.doctor_id,
            patient_id,
            date,
            time: payload.time,
            description: payload.description,
            is_video: payload.is_video,
        },
        ctx.state.notifier(),
    )?;

    Ok((StatusCode::CREATED, Json(AppointmentResponse { appointment })))
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/appointments` — the acting user's appointments.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let appointments = booking::list_for(&conn, &actor)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `GET /api/appointments/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let appointment = booking::get_for(&conn, &actor, &id)?;
    Ok(Json(AppointmentResponse { appointment }))
}

/// `POST /api/appointments/:id/confirm`
pub async fn confirm(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let mut conn = ctx.state.open_db()?;
    let appointment = booking::confirm(&mut conn, &actor, &id, ctx.state.notifier())?;
    Ok(Json(AppointmentResponse { appointment }))
}

/// `POST /api/appointments/:id/complete`
pub async fn complete(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let mut conn = ctx.state.open_db()?;
    let appointment = booking::complete(&mut conn, &actor, &id)?;
    Ok(Json(AppointmentResponse { appointment }))
}

/// `POST /api/appointments/:id/cancel`
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let mut conn = ctx.state.open_db()?;
    let appointment = booking::cancel(&mut conn, &actor, &id, ctx.state.notifier())?;
    Ok(Json(AppointmentResponse { appointment }))
}
