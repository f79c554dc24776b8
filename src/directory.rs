//! Directory store — departments, doctors, patients.
//!
//! Pure lookups and aggregate counts; no conflict logic lives here.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::repository;
use crate::error::BookingError;
use crate::identity::ActingIdentity;
use crate::models::enums::AppointmentStatus;
use crate::models::{Department, Doctor, Patient};

/// Department with its doctor headcount, for listing pages.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentInfo {
    #[serde(flatten)]
    pub department: Department,
    pub doctor_count: i64,
}

/// Doctor search filter.
#[derive(Debug, Clone, Default)]
pub struct DoctorFilter {
    pub department_id: Option<Uuid>,
    /// Case-insensitive match against the specialization.
    pub search: Option<String>,
}

/// Aggregate counts for the administrator overview.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub total_departments: i64,
    pub total_doctors: i64,
    pub total_patients: i64,
    pub total_appointments: i64,
    pub today_appointments: i64,
    pub pending_appointments: i64,
}

/// All departments with doctor counts, ordered by name.
pub fn list_departments(conn: &Connection) -> Result<Vec<DepartmentInfo>, BookingError> {
    let listed = repository::list_departments(conn)?;
    Ok(listed
        .into_iter()
        .map(|(department, doctor_count)| DepartmentInfo {
            department,
            doctor_count,
        })
        .collect())
}

pub fn get_department(conn: &Connection, id: &Uuid) -> Result<Department, BookingError> {
    repository::get_department(conn, id)?
        .ok_or_else(|| BookingError::not_found("Department", id))
}

/// Available doctors matching the filter.
pub fn list_doctors(
    conn: &Connection,
    filter: &DoctorFilter,
) -> Result<Vec<Doctor>, BookingError> {
    if let Some(dept) = &filter.department_id {
        // Filtering by an unknown department is a lookup error, not an
        // empty result.
        get_department(conn, dept)?;
    }
    Ok(repository::search_doctors(
        conn,
        filter.department_id.as_ref(),
        filter.search.as_deref(),
    )?)
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Doctor, BookingError> {
    repository::get_doctor(conn, id)?.ok_or_else(|| BookingError::not_found("Doctor", id))
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Patient, BookingError> {
    repository::get_patient(conn, id)?.ok_or_else(|| BookingError::not_found("Patient", id))
}

/// Aggregate hospital counts. Administrators only.
pub fn admin_overview(
    conn: &Connection,
    actor: &ActingIdentity,
    today: NaiveDate,
) -> Result<AdminOverview, BookingError> {
    if !actor.is_admin() {
        return Err(BookingError::Forbidden);
    }
    Ok(AdminOverview {
        total_departments: repository::count_departments(conn)?,
        total_doctors: repository::count_doctors(conn)?,
        total_patients: repository::count_patients(conn)?,
        total_appointments: repository::count_appointments(conn)?,
        today_appointments: repository::count_appointments_on(conn, today)?,
        pending_appointments: repository::count_appointments_with_status(
            conn,
            AppointmentStatus::Pending,
        )?,
    })
}
