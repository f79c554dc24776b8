use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{PaymentMethod, PaymentState};
use crate::models::Payment;

fn map_payment(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        appointment_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        amount_cents: row.get(2)?,
        status: PaymentState::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(PaymentState::Pending),
        method: PaymentMethod::from_str(&row.get::<_, String>(4)?)
            .unwrap_or(PaymentMethod::Card),
        transaction_id: row.get(5)?,
        card_last_four: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn insert_payment(conn: &Connection, payment: &Payment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payments (id, appointment_id, amount_cents, status, method,
             transaction_id, card_last_four, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            payment.id.to_string(),
            payment.appointment_id.to_string(),
            payment.amount_cents,
            payment.status.as_str(),
            payment.method.as_str(),
            payment.transaction_id,
            payment.card_last_four,
            payment.created_at,
            payment.updated_at,
        ],
    )?;
    Ok(())
}

/// The single payment row for an appointment, if one was ever created.
pub fn get_payment_by_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Option<Payment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, amount_cents, status, method,
                transaction_id, card_last_four, created_at, updated_at
         FROM payments WHERE appointment_id = ?1",
    )?;
    let mut rows = stmt.query_map(params![appointment_id.to_string()], map_payment)?;
    rows.next().transpose().map_err(DatabaseError::from)
}

/// Rewrite the mutable fields of an existing payment row.
pub fn update_payment(conn: &Connection, payment: &Payment) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE payments
         SET amount_cents = ?1, status = ?2, method = ?3, transaction_id = ?4,
             card_last_four = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            payment.amount_cents,
            payment.status.as_str(),
            payment.method.as_str(),
            payment.transaction_id,
            payment.card_last_four,
            payment.updated_at,
            payment.id.to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Payment".into(),
            id: payment.id.to_string(),
        });
    }
    Ok(())
}
