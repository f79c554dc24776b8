//! Domain error taxonomy for booking, payment, and record operations.
//!
//! Every variant except `Database` is recoverable by the caller; the API
//! layer maps each to a stable code and HTTP status. `Database` wraps
//! failures of the durable store itself and is never retried here.

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("the acting user is not permitted to perform this operation")]
    Forbidden,

    #[error("this time slot is already booked")]
    SlotConflict,

    #[error("cannot {action} an appointment in the '{from}' state")]
    InvalidTransition { from: String, action: &'static str },

    #[error("this appointment is already cancelled")]
    AlreadyCancelled,

    #[error("a completed appointment cannot be cancelled")]
    TerminalState,

    #[error("this appointment has already been paid")]
    AlreadyPaid,

    #[error("card details were rejected")]
    PaymentRejected,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl BookingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for BookingError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::Sqlite(err))
    }
}

/// True when the given database error is the slot uniqueness index firing.
/// The index backstops the in-transaction conflict check; both surface as
/// `SlotConflict`. SQLite names either the index or its columns in the
/// message depending on how the violation is reported.
pub fn is_slot_constraint(err: &DatabaseError) -> bool {
    match err {
        DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(code, message)) => {
            code.code == rusqlite::ErrorCode::ConstraintViolation
                && message.as_deref().is_some_and(|m| {
                    m.contains("idx_appointments_slot")
                        || m.contains("appointments.doctor_id")
                })
        }
        _ => false,
    }
}
