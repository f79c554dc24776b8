use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Department;

fn map_department(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn insert_department(conn: &Connection, dept: &Department) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO departments (id, name, description, icon, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            dept.id.to_string(),
            dept.name,
            dept.description,
            dept.icon,
            dept.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_department(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Department>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, icon, created_at
         FROM departments WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id.to_string()], map_department)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

/// All departments with their doctor counts, ordered by name.
pub fn list_departments(
    conn: &Connection,
) -> Result<Vec<(Department, i64)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT d.id, d.name, d.description, d.icon, d.created_at,
                (SELECT COUNT(*) FROM doctors WHERE department_id = d.id)
         FROM departments d
         ORDER BY d.name ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok((map_department(row)?, row.get(5)?)))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Delete a department. Doctors keep their rows with a detached
/// department reference (ON DELETE SET NULL).
pub fn delete_department(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM departments WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Department".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn count_departments(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM departments", [], |row| row.get(0))?;
    Ok(count)
}
