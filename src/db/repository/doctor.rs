use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Doctor;

fn map_doctor(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        department_id: row
            .get::<_, Option<String>>(2)?
            .and_then(|s| Uuid::parse_str(&s).ok()),
        specialization: row.get(3)?,
        experience_years: row.get(4)?,
        bio: row.get(5)?,
        consultation_fee_cents: row.get(6)?,
        is_available: row.get(7)?,
    })
}

const DOCTOR_COLUMNS: &str = "id, user_id, department_id, specialization, \
     experience_years, bio, consultation_fee_cents, is_available";

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, user_id, department_id, specialization,
             experience_years, bio, consultation_fee_cents, is_available)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            doctor.id.to_string(),
            doctor.user_id.to_string(),
            doctor.department_id.map(|d| d.to_string()),
            doctor.specialization,
            doctor.experience_years,
            doctor.bio,
            doctor.consultation_fee_cents,
            doctor.is_available,
        ],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id.to_string()], map_doctor)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

/// Doctor row owned by the given user identity, if any.
pub fn get_doctor_by_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE user_id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![user_id.to_string()], map_doctor)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

/// Available doctors, optionally narrowed to a department and/or a
/// case-insensitive specialization search.
pub fn search_doctors(
    conn: &Connection,
    department_id: Option<&Uuid>,
    search: Option<&str>,
) -> Result<Vec<Doctor>, DatabaseError> {
    let mut sql = format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE is_available = 1"
    );
    let mut args: Vec<String> = Vec::new();

    if let Some(dept) = department_id {
        args.push(dept.to_string());
        sql.push_str(&format!(" AND department_id = ?{}", args.len()));
    }
    if let Some(term) = search {
        args.push(format!("%{}%", term.to_lowercase()));
        sql.push_str(&format!(
            " AND LOWER(specialization) LIKE ?{}",
            args.len()
        ));
    }
    sql.push_str(" ORDER BY specialization ASC, experience_years DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), map_doctor)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn set_doctor_availability(
    conn: &Connection,
    id: &Uuid,
    is_available: bool,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET is_available = ?1 WHERE id = ?2",
        params![is_available, id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn count_doctors(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))?;
    Ok(count)
}
