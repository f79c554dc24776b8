use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{AppointmentStatus, PaymentStatus};
use crate::models::Appointment;

fn map_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        doctor_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        patient_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
        date: row.get(3)?,
        time: row.get(4)?,
        status: AppointmentStatus::from_str(&row.get::<_, String>(5)?)
            .unwrap_or(AppointmentStatus::Pending),
        payment_status: PaymentStatus::from_str(&row.get::<_, String>(6)?)
            .unwrap_or(PaymentStatus::Pending),
        is_video: row.get(7)?,
        description: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const APPOINTMENT_COLUMNS: &str = "id, doctor_id, patient_id, date, time, status, \
     payment_status, is_video, description, created_at, updated_at";

pub fn insert_appointment(
    conn: &Connection,
    appointment: &Appointment,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, doctor_id, patient_id, date, time, status,
             payment_status, is_video, description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            appointment.id.to_string(),
            appointment.doctor_id.to_string(),
            appointment.patient_id.to_string(),
            appointment.date,
            appointment.time,
            appointment.status.as_str(),
            appointment.payment_status.as_str(),
            appointment.is_video,
            appointment.description,
            appointment.created_at,
            appointment.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id.to_string()], map_appointment)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

/// Time labels held by non-cancelled appointments for a doctor on a date,
/// in slot order.
pub fn occupied_times(
    conn: &Connection,
    doctor_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT time FROM appointments
         WHERE doctor_id = ?1 AND date = ?2 AND status != 'cancelled'
         ORDER BY time ASC",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string(), date], |row| row.get(0))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// (date, time) pairs held by non-cancelled appointments in a date range,
/// inclusive on both ends.
pub fn occupied_in_range(
    conn: &Connection,
    doctor_id: &Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(NaiveDate, String)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT date, time FROM appointments
         WHERE doctor_id = ?1 AND date >= ?2 AND date <= ?3
           AND status != 'cancelled'
         ORDER BY date ASC, time ASC",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string(), from, to], |row| {
        Ok((row.get(0)?, row.get(1)?))
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn set_appointment_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![
            status.as_str(),
            chrono::Local::now().naive_local(),
            id.to_string()
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn set_payment_status(
    conn: &Connection,
    id: &Uuid,
    payment_status: PaymentStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET payment_status = ?1, updated_at = ?2 WHERE id = ?3",
        params![
            payment_status.as_str(),
            chrono::Local::now().naive_local(),
            id.to_string()
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// A doctor's appointments, newest date first.
pub fn appointments_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE doctor_id = ?1
         ORDER BY date DESC, time DESC"
    ))?;
    let rows = stmt.query_map(params![doctor_id.to_string()], map_appointment)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// A patient's appointments, newest date first.
pub fn appointments_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE patient_id = ?1
         ORDER BY date DESC, time DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], map_appointment)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_appointments(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_appointments_on(
    conn: &Connection,
    date: NaiveDate,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE date = ?1",
        params![date],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_appointments_with_status(
    conn: &Connection,
    status: AppointmentStatus,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE status = ?1",
        params![status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}
