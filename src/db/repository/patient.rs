use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::BloodType;
use crate::models::Patient;

fn map_patient(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        date_of_birth: row.get(2)?,
        blood_type: row
            .get::<_, Option<String>>(3)?
            .and_then(|s| BloodType::from_str(&s).ok()),
        address: row.get(4)?,
        emergency_contact: row.get(5)?,
        emergency_phone: row.get(6)?,
        medical_notes: row.get(7)?,
    })
}

const PATIENT_COLUMNS: &str = "id, user_id, date_of_birth, blood_type, address, \
     emergency_contact, emergency_phone, medical_notes";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, user_id, date_of_birth, blood_type, address,
             emergency_contact, emergency_phone, medical_notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            patient.id.to_string(),
            patient.user_id.to_string(),
            patient.date_of_birth,
            patient.blood_type.map(|b| b.as_str()),
            patient.address,
            patient.emergency_contact,
            patient.emergency_phone,
            patient.medical_notes,
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id.to_string()], map_patient)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

/// Patient row owned by the given user identity, if any.
pub fn get_patient_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE user_id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![user_id.to_string()], map_patient)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}
