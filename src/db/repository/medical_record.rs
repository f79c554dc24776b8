use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::MedicalRecord;

fn map_record(row: &Row<'_>) -> rusqlite::Result<MedicalRecord> {
    Ok(MedicalRecord {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        appointment_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        diagnosis: row.get(2)?,
        symptoms: row.get(3)?,
        medicines: row.get(4)?,
        instructions: row.get(5)?,
        follow_up_date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const RECORD_COLUMNS: &str = "id, appointment_id, diagnosis, symptoms, medicines, \
     instructions, follow_up_date, created_at, updated_at";

pub fn insert_medical_record(
    conn: &Connection,
    record: &MedicalRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medical_records (id, appointment_id, diagnosis, symptoms,
             medicines, instructions, follow_up_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id.to_string(),
            record.appointment_id.to_string(),
            record.diagnosis,
            record.symptoms,
            record.medicines,
            record.instructions,
            record.follow_up_date,
            record.created_at,
            record.updated_at,
        ],
    )?;
    Ok(())
}

/// Records of one appointment, newest first.
pub fn records_for_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records
         WHERE appointment_id = ?1
         ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![appointment_id.to_string()], map_record)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// All records across a patient's appointments, newest first.
pub fn records_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.appointment_id, r.diagnosis, r.symptoms, r.medicines,
                r.instructions, r.follow_up_date, r.created_at, r.updated_at
         FROM medical_records r
         JOIN appointments a ON r.appointment_id = a.id
         WHERE a.patient_id = ?1
         ORDER BY r.created_at DESC",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], map_record)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
