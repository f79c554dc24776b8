use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AppointmentStatus, PaymentStatus};

/// Booking between a doctor and a patient for one catalog slot.
///
/// At most one non-cancelled appointment may exist per
/// (doctor, date, time); cancelled rows free the slot for rebooking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    /// Slot label from the fixed catalog ("09:00" .. "17:00"), not a duration.
    pub time: String,
    pub status: AppointmentStatus,
    /// Tracked independently of the Payment row's own state.
    pub payment_status: PaymentStatus,
    pub is_video: bool,
    /// Reason for visit.
    pub description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    /// Room label for video consultations. Pure generator; the video
    /// transport itself lives outside this crate.
    pub fn video_room_id(&self) -> Option<String> {
        if !self.is_video {
            return None;
        }
        Some(format!(
            "medicare-appointment-{}-{}",
            self.id,
            self.date.format("%Y%m%d")
        ))
    }
}
