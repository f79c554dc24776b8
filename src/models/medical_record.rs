use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prescription issued against an appointment. An appointment may carry
/// any number of records; each record belongs to exactly one appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub diagnosis: String,
    pub symptoms: String,
    /// Prescribed medicines, one per line.
    pub medicines: String,
    pub instructions: String,
    pub follow_up_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl MedicalRecord {
    /// Medicines as trimmed non-empty lines.
    pub fn medicine_list(&self) -> Vec<&str> {
        self.medicines
            .lines()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .collect()
    }
}
