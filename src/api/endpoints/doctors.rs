//! Doctor directory and slot-calendar endpoints.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::directory::{self, DoctorFilter};
use crate::models::Doctor;
use crate::slots::{self, SlotAvailability};

#[derive(Deserialize)]
pub struct DoctorListQuery {
    pub department_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub doctors: Vec<Doctor>,
}

/// `GET /api/doctors?department_id=&search=` — available doctors.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<DoctorsResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let doctors = directory::list_doctors(
        &conn,
        &DoctorFilter {
            department_id: query.department_id,
            search: query.search,
        },
    )?;
    Ok(Json(DoctorsResponse { doctors }))
}

#[derive(Serialize)]
pub struct DoctorResponse {
    pub doctor: Doctor,
}

/// `GET /api/doctors/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DoctorResponse>, ApiError> {
    let conn = ctx.state.open_db()?;
    let doctor = directory::get_doctor(&conn, &id)?;
    Ok(Json(DoctorResponse { doctor }))
}

fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub slots: Vec<SlotAvailability>,
    pub available: Vec<String>,
}

/// `GET /api/doctors/:id/slots?date=YYYY-MM-DD` — per-slot availability
/// for one day, used to render the booking form.
pub async fn day_slots(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, ApiError> {
    let date = parse_date(&query.date)?;
    let conn = ctx.state.open_db()?;
    let schedule = slots::day_schedule(&conn, &id, date)?;
    let available = schedule
        .iter()
        .filter(|s| s.available)
        .map(|s| s.value.clone())
        .collect();
    Ok(Json(SlotsResponse {
        date,
        slots: schedule,
        available,
    }))
}

#[derive(Deserialize)]
pub struct CalendarQuery {
    pub from: String,
    pub to: String,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    pub booked: BTreeMap<NaiveDate, Vec<String>>,
}

/// `GET /api/doctors/:id/calendar?from=&to=` — booked slots per date
/// over a capped range.
pub async fn calendar(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, ApiError> {
    let from = parse_date(&query.from)?;
    let to = parse_date(&query.to)?;
    let conn = ctx.state.open_db()?;
    let booked = slots::booked_slots_in_range(&conn, &id, from, to)?;
    Ok(Json(CalendarResponse { booked }))
}
