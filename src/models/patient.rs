use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::BloodType;

/// Patient profile linked to an externally-managed user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_type: Option<BloodType>,
    pub address: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    /// Allergies, chronic conditions, etc.
    pub medical_notes: String,
}

impl Patient {
    /// Age in whole years as of `today`, when a date of birth is recorded.
    pub fn age(&self, today: NaiveDate) -> Option<i32> {
        let dob = self.date_of_birth?;
        let mut years = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        Some(years)
    }
}
