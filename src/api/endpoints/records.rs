//! Medical-record endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::error::BookingError;
use crate::identity::{ActingIdentity, Role};
use crate::models::MedicalRecord;
use crate::records::{self, RecordRequest};

#[derive(Deserialize)]
pub struct RecordPayload {
    pub diagnosis: String,
    #[serde(default)]
    pub symptoms: String,
    pub medicines: String,
    #[serde(default)]
    pub instructions: String,
    pub follow_up_date: Option<String>,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub record: MedicalRecord,
}

/// `POST /api/appointments/:id/records` — prescribe; also completes
/// the appointment.
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPayload>,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let follow_up_date = payload
        .follow_up_date
        .as_deref()
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
                ApiError::BadRequest(format!("invalid date '{v}', expected YYYY-MM-DD"))
            })
        })
        .transpose()?;

    let mut conn = ctx.state.open_db()?;
    let record = records::add_record(
        &mut conn,
        &actor,
        &id,
        &RecordRequest {
            diagnosis: payload.diagnosis,
            symptoms: payload.symptoms,
            medicines: payload.medicines,
            instructions: payload.instructions,
            follow_up_date,
        },
    )?;
    Ok((StatusCode::CREATED, Json(RecordResponse { record })))
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub records: Vec<MedicalRecord>,
}

/// `GET /api/appointments/:id/records`
pub async fn for_appointment(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let records = records::records_for_appointment(&conn, &actor, &id)?;
    Ok(Json(RecordsResponse { records }))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    /// Administrators pass the patient explicitly; patients read their own.
    pub patient_id: Option<Uuid>,
}

/// `GET /api/records` — full medical history, newest first.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActingIdentity>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let conn = ctx.state.open_db()?;

    let patient_id = match (actor.role, query.patient_id) {
        (Role::Admin, Some(id)) => id,
        (Role::Admin, None) => {
            return Err(ApiError::BadRequest(
                "patient_id is required for administrator reads".into(),
            ))
        }
        _ => {
            let patient = repository::get_patient_by_user(&conn, &actor.user_id)
                .map_err(ApiError::from)?
                .ok_or(ApiError::Domain(BookingError::not_found(
                    "Patient",
                    actor.user_id,
                )))?;
            patient.id
        }
    };

    let records = records::history_for_patient(&conn, &actor, &patient_id)?;
    Ok(Json(RecordsResponse { records }))
}
