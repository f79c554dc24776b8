use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{PaymentMethod, PaymentState};

/// Payment attempt for an appointment. One-to-one with the appointment:
/// later attempts update this row, they never create a second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    /// Doctor's consultation fee in cents, read at payment time.
    pub amount_cents: i64,
    pub status: PaymentState,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub card_last_four: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
