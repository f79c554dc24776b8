use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Doctor profile linked to an externally-managed user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    /// Identity provider's user id; authorization compares against this.
    pub user_id: Uuid,
    /// Department deletion detaches rather than cascades.
    pub department_id: Option<Uuid>,
    pub specialization: String,
    pub experience_years: u32,
    pub bio: String,
    /// Fixed-point currency in cents, never negative.
    pub consultation_fee_cents: i64,
    pub is_available: bool,
}
