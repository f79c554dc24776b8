//! Medical record ledger — prescriptions attached to appointments.
//!
//! Adding a record is a combined operation: the record is inserted and
//! the appointment moves to `completed` in the same transaction. The
//! read path serves a patient's full history, newest first.

use chrono::{Local, NaiveDate};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::db::repository;
use crate::error::{is_slot_constraint, BookingError};
use crate::identity::{ActingIdentity, Role};
use crate::models::enums::AppointmentStatus;
use crate::models::MedicalRecord;

/// Input for a new prescription.
#[derive(Debug, Clone)]
pub struct RecordRequest {
    pub diagnosis: String,
    pub symptoms: String,
    pub medicines: String,
    pub instructions: String,
    pub follow_up_date: Option<NaiveDate>,
}

/// Attach a prescription to an appointment and mark it completed.
///
/// Diagnosis and medicines are required. Ownership is enforced; the
/// status transition is not gated on the prior state, so a doctor can
/// prescribe against a pending, confirmed, or already-completed visit.
pub fn add_record(
    conn: &mut Connection,
    actor: &ActingIdentity,
    appointment_id: &Uuid,
    request: &RecordRequest,
) -> Result<MedicalRecord, BookingError> {
    if request.diagnosis.trim().is_empty() {
        return Err(BookingError::Validation("diagnosis is required".into()));
    }
    if request.medicines.trim().is_empty() {
        return Err(BookingError::Validation("medicines are required".into()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let appointment = repository::get_appointment(&tx, appointment_id)?
        .ok_or_else(|| BookingError::not_found("Appointment", appointment_id))?;

    if actor.role != Role::Doctor {
        return Err(BookingError::Forbidden);
    }
    let doctor = repository::get_doctor(&tx, &appointment.doctor_id)?
        .ok_or_else(|| BookingError::not_found("Doctor", appointment.doctor_id))?;
    if doctor.user_id != actor.user_id {
        return Err(BookingError::Forbidden);
    }

    let now = Local::now().naive_local();
    let record = MedicalRecord {
        id: Uuid::new_v4(),
        appointment_id: *appointment_id,
        diagnosis: request.diagnosis.clone(),
        symptoms: request.symptoms.clone(),
        medicines: request.medicines.clone(),
        instructions: request.instructions.clone(),
        follow_up_date: request.follow_up_date,
        created_at: now,
        updated_at: now,
    };
    repository::insert_medical_record(&tx, &record)?;

    if appointment.status != AppointmentStatus::Completed {
        // Reviving a cancelled visit re-enters the slot index; if the
        // slot was rebooked in the meantime the uniqueness invariant
        // wins over the transition.
        if let Err(e) =
            repository::set_appointment_status(&tx, appointment_id, AppointmentStatus::Completed)
        {
            if is_slot_constraint(&e) {
                return Err(BookingError::SlotConflict);
            }
            return Err(e.into());
        }
    }
    tx.commit()?;

    tracing::info!(
        appointment_id = %appointment_id,
        record_id = %record.id,
        "medical record added, appointment completed"
    );
    Ok(record)
}

/// A patient's complete history, newest first. Visible to the patient
/// themselves and to administrators.
pub fn history_for_patient(
    conn: &Connection,
    actor: &ActingIdentity,
    patient_id: &Uuid,
) -> Result<Vec<MedicalRecord>, BookingError> {
    let patient = repository::get_patient(conn, patient_id)?
        .ok_or_else(|| BookingError::not_found("Patient", patient_id))?;

    match actor.role {
        Role::Admin => {}
        Role::Patient if patient.user_id == actor.user_id => {}
        _ => return Err(BookingError::Forbidden),
    }

    Ok(repository::records_for_patient(conn, patient_id)?)
}

/// Records of one appointment, visible to its participants and admins.
pub fn records_for_appointment(
    conn: &Connection,
    actor: &ActingIdentity,
    appointment_id: &Uuid,
) -> Result<Vec<MedicalRecord>, BookingError> {
    // Reuse the booking detail authorization.
    crate::booking::get_for(conn, actor, appointment_id)?;
    Ok(repository::records_for_appointment(conn, appointment_id)?)
}
