//! Booking engine — appointment creation and lifecycle transitions.
//!
//! State machine: `pending → {confirmed, cancelled}`,
//! `confirmed → {completed, cancelled}`; `completed` and `cancelled` are
//! terminal. A doctor may also complete straight from `pending`.
//!
//! Every mutating operation runs inside an immediate transaction so the
//! conflict check and the precondition check read the row the commit will
//! apply to. Concurrent callers serialize on the database write lock;
//! the loser re-reads committed state and fails its precondition.

use chrono::{Local, NaiveDate};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::db::repository;
use crate::error::{is_slot_constraint, BookingError};
use crate::identity::{ActingIdentity, Role};
use crate::models::enums::{AppointmentStatus, PaymentStatus};
use crate::models::{Appointment, Doctor};
use crate::notify::{send_best_effort, Notifier};
use crate::slots;

/// Input for a new booking.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub description: String,
    pub is_video: bool,
}

fn load_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, BookingError> {
    repository::get_appointment(conn, id)?
        .ok_or_else(|| BookingError::not_found("Appointment", id))
}

fn load_doctor_of_record(
    conn: &Connection,
    appointment: &Appointment,
) -> Result<Doctor, BookingError> {
    repository::get_doctor(conn, &appointment.doctor_id)?
        .ok_or_else(|| BookingError::not_found("Doctor", appointment.doctor_id))
}

/// The acting user must be the doctor of record.
fn require_owning_doctor(
    conn: &Connection,
    actor: &ActingIdentity,
    appointment: &Appointment,
) -> Result<(), BookingError> {
    if actor.role != Role::Doctor {
        return Err(BookingError::Forbidden);
    }
    let doctor = load_doctor_of_record(conn, appointment)?;
    if doctor.user_id != actor.user_id {
        return Err(BookingError::Forbidden);
    }
    Ok(())
}

/// The acting user must be a participant (owning doctor or patient) or
/// an administrator.
fn require_participant(
    conn: &Connection,
    actor: &ActingIdentity,
    appointment: &Appointment,
) -> Result<(), BookingError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Doctor => require_owning_doctor(conn, actor, appointment),
        Role::Patient => {
            let patient = repository::get_patient(conn, &appointment.patient_id)?
                .ok_or_else(|| BookingError::not_found("Patient", appointment.patient_id))?;
            if patient.user_id != actor.user_id {
                return Err(BookingError::Forbidden);
            }
            Ok(())
        }
    }
}

/// Book a slot. The conflict check and the insert share one immediate
/// transaction; two racing requests for the same (doctor, date, time)
/// yield exactly one success and one `SlotConflict`.
pub fn create(
    conn: &mut Connection,
    actor: &ActingIdentity,
    request: &BookingRequest,
    notifier: &dyn Notifier,
) -> Result<Appointment, BookingError> {
    if !slots::is_catalog_slot(&request.time) {
        return Err(BookingError::Validation(format!(
            "'{}' is not a bookable time slot",
            request.time
        )));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let doctor = repository::get_doctor(&tx, &request.doctor_id)?
        .filter(|d| d.is_available)
        .ok_or_else(|| BookingError::not_found("Doctor", request.doctor_id))?;

    let patient = repository::get_patient(&tx, &request.patient_id)?
        .ok_or_else(|| BookingError::not_found("Patient", request.patient_id))?;

    // Only the patient themselves (or an administrator on their behalf)
    // may book.
    match actor.role {
        Role::Patient if patient.user_id == actor.user_id => {}
        Role::Admin => {}
        _ => return Err(BookingError::Forbidden),
    }

    if repository::occupied_times(&tx, &doctor.id, request.date)?.contains(&request.time) {
        return Err(BookingError::SlotConflict);
    }

    let now = Local::now().naive_local();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        doctor_id: doctor.id,
        patient_id: patient.id,
        date: request.date,
        time: request.time.clone(),
        status: AppointmentStatus::Pending,
        payment_status: PaymentStatus::Pending,
        is_video: request.is_video,
        description: request.description.clone(),
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = repository::insert_appointment(&tx, &appointment) {
        // The partial unique index backstops the check above.
        if is_slot_constraint(&e) {
            return Err(BookingError::SlotConflict);
        }
        return Err(e.into());
    }
    tx.commit()?;

    tracing::info!(
        appointment_id = %appointment.id,
        doctor_id = %appointment.doctor_id,
        date = %appointment.date,
        time = %appointment.time,
        "appointment booked"
    );
    send_best_effort(
        notifier,
        &appointment,
        "Your appointment has been booked!",
        "Your appointment has been successfully booked. Please find the details below.",
    );

    Ok(appointment)
}

/// Doctor confirms a pending appointment.
pub fn confirm(
    conn: &mut Connection,
    actor: &ActingIdentity,
    appointment_id: &Uuid,
    notifier: &dyn Notifier,
) -> Result<Appointment, BookingError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let appointment = load_appointment(&tx, appointment_id)?;
    require_owning_doctor(&tx, actor, &appointment)?;

    if appointment.status != AppointmentStatus::Pending {
        return Err(BookingError::InvalidTransition {
            from: appointment.status.as_str().into(),
            action: "confirm",
        });
    }

    repository::set_appointment_status(&tx, appointment_id, AppointmentStatus::Confirmed)?;
    let updated = load_appointment(&tx, appointment_id)?;
    tx.commit()?;

    send_best_effort(
        notifier,
        &updated,
        "Your appointment has been confirmed!",
        "A doctor has confirmed your appointment. Details are below.",
    );

    Ok(updated)
}

/// Doctor marks an appointment completed. Allowed straight from
/// `pending` as well as from `confirmed`.
pub fn complete(
    conn: &mut Connection,
    actor: &ActingIdentity,
    appointment_id: &Uuid,
) -> Result<Appointment, BookingError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let appointment = load_appointment(&tx, appointment_id)?;
    require_owning_doctor(&tx, actor, &appointment)?;

    match appointment.status {
        AppointmentStatus::Pending | AppointmentStatus::Confirmed => {}
        AppointmentStatus::Cancelled => return Err(BookingError::AlreadyCancelled),
        AppointmentStatus::Completed => {
            return Err(BookingError::InvalidTransition {
                from: appointment.status.as_str().into(),
                action: "complete",
            })
        }
    }

    repository::set_appointment_status(&tx, appointment_id, AppointmentStatus::Completed)?;
    let updated = load_appointment(&tx, appointment_id)?;
    tx.commit()?;

    Ok(updated)
}

/// Cancel an appointment. Idempotent from the caller's perspective:
/// a second cancel fails with `AlreadyCancelled` and changes nothing.
/// Completed appointments are terminal (`TerminalState`). Cancelling
/// never refunds; that is a separate payment-gate operation.
pub fn cancel(
    conn: &mut Connection,
    actor: &ActingIdentity,
    appointment_id: &Uuid,
    notifier: &dyn Notifier,
) -> Result<Appointment, BookingError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let appointment = load_appointment(&tx, appointment_id)?;
    require_participant(&tx, actor, &appointment)?;

    match appointment.status {
        AppointmentStatus::Cancelled => return Err(BookingError::AlreadyCancelled),
        AppointmentStatus::Completed => return Err(BookingError::TerminalState),
        _ => {}
    }

    repository::set_appointment_status(&tx, appointment_id, AppointmentStatus::Cancelled)?;
    let updated = load_appointment(&tx, appointment_id)?;
    tx.commit()?;

    tracing::info!(appointment_id = %updated.id, "appointment cancelled");
    send_best_effort(
        notifier,
        &updated,
        "Your appointment has been cancelled",
        "This is a confirmation that your appointment has been cancelled. Details are below.",
    );

    Ok(updated)
}

/// Appointment detail, visible to its participants and administrators.
pub fn get_for(
    conn: &Connection,
    actor: &ActingIdentity,
    appointment_id: &Uuid,
) -> Result<Appointment, BookingError> {
    let appointment = load_appointment(conn, appointment_id)?;
    require_participant(conn, actor, &appointment)?;
    Ok(appointment)
}

/// The acting user's appointments: a doctor sees their schedule, a
/// patient their bookings. Administrators use the overview queries
/// instead.
pub fn list_for(
    conn: &Connection,
    actor: &ActingIdentity,
) -> Result<Vec<Appointment>, BookingError> {
    match actor.role {
        Role::Doctor => {
            let doctor = repository::get_doctor_by_user(conn, &actor.user_id)?
                .ok_or_else(|| BookingError::not_found("Doctor", actor.user_id))?;
            Ok(repository::appointments_for_doctor(conn, &doctor.id)?)
        }
        Role::Patient => {
            let patient = repository::get_patient_by_user(conn, &actor.user_id)?
                .ok_or_else(|| BookingError::not_found("Patient", actor.user_id))?;
            Ok(repository::appointments_for_patient(conn, &patient.id)?)
        }
        Role::Admin => Err(BookingError::Forbidden),
    }
}
