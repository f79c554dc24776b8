//! Payment gate — one payment per appointment, stub capture, refunds.
//!
//! Card processing is a stand-in acceptance rule (13+ digits after
//! stripping separators), not a gateway integration. The amount charged
//! is the doctor's consultation fee read at payment time. Payment state
//! and appointment state stay deliberately decoupled: a refund does not
//! cancel the appointment and a cancellation does not refund.

use chrono::Local;
use rand::Rng;
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::db::repository;
use crate::error::BookingError;
use crate::identity::{ActingIdentity, Role};
use crate::models::enums::{PaymentMethod, PaymentState, PaymentStatus};
use crate::models::{Appointment, Payment};

/// Minimum digit count for the card-number surrogate.
const MIN_CARD_DIGITS: usize = 13;

/// Strip common separators; `None` unless the remainder is all digits
/// and long enough.
fn sanitize_card_number(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    if digits.len() >= MIN_CARD_DIGITS && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

fn transaction_reference(prefix: &str, hex_len: usize) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..hex_len)
        .map(|_| {
            let nibble: u8 = rng.gen_range(0..16);
            char::from_digit(nibble as u32, 16).unwrap_or('0')
        })
        .collect();
    format!("{prefix}-{}", suffix.to_uppercase())
}

fn require_owning_patient(
    conn: &Connection,
    actor: &ActingIdentity,
    appointment: &Appointment,
) -> Result<(), BookingError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Patient => {
            let patient = repository::get_patient(conn, &appointment.patient_id)?
                .ok_or_else(|| BookingError::not_found("Patient", appointment.patient_id))?;
            if patient.user_id != actor.user_id {
                return Err(BookingError::Forbidden);
            }
            Ok(())
        }
        Role::Doctor => Err(BookingError::Forbidden),
    }
}

/// Initiate (or settle) the payment for an appointment.
///
/// Idempotent against the one-to-one Payment row: an existing row is
/// updated in place, a second row is never created. Fails with
/// `AlreadyPaid` once the appointment is marked paid, without mutating
/// anything. A rejected card leaves no trace either.
pub fn initiate(
    conn: &mut Connection,
    actor: &ActingIdentity,
    appointment_id: &Uuid,
    method: PaymentMethod,
    card_number: Option<&str>,
) -> Result<Payment, BookingError> {
    // Validate the card before touching any state.
    let card_digits = match method {
        PaymentMethod::Card => Some(
            card_number
                .and_then(sanitize_card_number)
                .ok_or(BookingError::PaymentRejected)?,
        ),
        PaymentMethod::Cash => None,
    };

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let appointment = repository::get_appointment(&tx, appointment_id)?
        .ok_or_else(|| BookingError::not_found("Appointment", appointment_id))?;
    require_owning_patient(&tx, actor, &appointment)?;

    if appointment.payment_status == PaymentStatus::Paid {
        return Err(BookingError::AlreadyPaid);
    }

    // Fee is read at payment time, not snapshotted at booking time.
    let doctor = repository::get_doctor(&tx, &appointment.doctor_id)?
        .ok_or_else(|| BookingError::not_found("Doctor", appointment.doctor_id))?;

    let now = Local::now().naive_local();
    let mut payment = match repository::get_payment_by_appointment(&tx, appointment_id)? {
        Some(existing) => existing,
        None => {
            let fresh = Payment {
                id: Uuid::new_v4(),
                appointment_id: *appointment_id,
                amount_cents: doctor.consultation_fee_cents,
                status: PaymentState::Pending,
                method,
                transaction_id: Some(transaction_reference("PENDING", 8)),
                card_last_four: None,
                created_at: now,
                updated_at: now,
            };
            repository::insert_payment(&tx, &fresh)?;
            fresh
        }
    };

    payment.amount_cents = doctor.consultation_fee_cents;
    payment.method = method;
    payment.updated_at = now;

    match method {
        PaymentMethod::Card => {
            let digits = card_digits.unwrap_or_default();
            payment.status = PaymentState::Completed;
            payment.transaction_id = Some(transaction_reference("TXN", 12));
            payment.card_last_four =
                Some(digits[digits.len() - 4..].to_string());
            repository::update_payment(&tx, &payment)?;
            repository::set_payment_status(&tx, appointment_id, PaymentStatus::Paid)?;
        }
        PaymentMethod::Cash => {
            // Deferred settlement at the facility; a terminal success for
            // the booking flow even though no money has moved.
            payment.status = PaymentState::Pending;
            payment.transaction_id = Some(transaction_reference("CASH", 8));
            payment.card_last_four = Some("0000".into());
            repository::update_payment(&tx, &payment)?;
        }
    }

    tx.commit()?;
    tracing::info!(
        appointment_id = %appointment_id,
        method = method.as_str(),
        status = payment.status.as_str(),
        "payment recorded"
    );
    Ok(payment)
}

/// Refund a captured payment. Only legal from `completed`; a pending
/// cash payment cannot be refunded. Does not touch the appointment's
/// lifecycle status.
pub fn refund(
    conn: &mut Connection,
    actor: &ActingIdentity,
    appointment_id: &Uuid,
) -> Result<Payment, BookingError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let appointment = repository::get_appointment(&tx, appointment_id)?
        .ok_or_else(|| BookingError::not_found("Appointment", appointment_id))?;
    require_owning_patient(&tx, actor, &appointment)?;

    let mut payment = repository::get_payment_by_appointment(&tx, appointment_id)?
        .ok_or_else(|| BookingError::not_found("Payment", appointment_id))?;

    if payment.status != PaymentState::Completed {
        return Err(BookingError::InvalidTransition {
            from: payment.status.as_str().into(),
            action: "refund",
        });
    }

    payment.status = PaymentState::Refunded;
    payment.updated_at = Local::now().naive_local();
    repository::update_payment(&tx, &payment)?;
    repository::set_payment_status(&tx, appointment_id, PaymentStatus::Refunded)?;
    tx.commit()?;

    tracing::info!(appointment_id = %appointment_id, "payment refunded");
    Ok(payment)
}

/// The payment row for an appointment, for its participants and admins.
pub fn get_for(
    conn: &Connection,
    actor: &ActingIdentity,
    appointment_id: &Uuid,
) -> Result<Option<Payment>, BookingError> {
    let appointment = repository::get_appointment(conn, appointment_id)?
        .ok_or_else(|| BookingError::not_found("Appointment", appointment_id))?;
    match actor.role {
        Role::Admin => {}
        Role::Patient => require_owning_patient(conn, actor, &appointment)?,
        Role::Doctor => {
            let doctor = repository::get_doctor(conn, &appointment.doctor_id)?
                .ok_or_else(|| BookingError::not_found("Doctor", appointment.doctor_id))?;
            if doctor.user_id != actor.user_id {
                return Err(BookingError::Forbidden);
            }
        }
    }
    Ok(repository::get_payment_by_appointment(conn, appointment_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{self, BookingRequest};
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Doctor, Patient};
    use crate::notify::testing::RecordingNotifier;
    use chrono::NaiveDate;

    struct Fixture {
        conn: Connection,
        doctor: Doctor,
        patient_actor: ActingIdentity,
        appointment_id: Uuid,
    }

    fn fixture() -> Fixture {
        let mut conn = open_memory_database().unwrap();
        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            department_id: None,
            specialization: "Cardiology".into(),
            experience_years: 12,
            bio: String::new(),
            consultation_fee_cents: 7500,
            is_available: true,
        };
        repository::insert_doctor(&conn, &doctor).unwrap();

        let patient = Patient {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date_of_birth: None,
            blood_type: None,
            address: String::new(),
            emergency_contact: String::new(),
            emergency_phone: String::new(),
            medical_notes: String::new(),
        };
        repository::insert_patient(&conn, &patient).unwrap();

        let patient_actor = ActingIdentity::patient(patient.user_id);
        let appointment = booking::create(
            &mut conn,
            &patient_actor,
            &BookingRequest {
                doctor_id: doctor.id,
                patient_id: patient.id,
                date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                time: "09:00".into(),
                description: String::new(),
                is_video: false,
            },
            &RecordingNotifier::default(),
        )
        .unwrap();

        Fixture {
            conn,
            doctor,
            patient_actor,
            appointment_id: appointment.id,
        }
    }

    #[test]
    fn card_number_sanitization() {
        assert_eq!(
            sanitize_card_number("4111 1111 1111 1111").as_deref(),
            Some("4111111111111111")
        );
        assert_eq!(
            sanitize_card_number("4111-1111-1111-1111").as_deref(),
            Some("4111111111111111")
        );
        // Too short
        assert!(sanitize_card_number("4111 1111").is_none());
        // Non-digits
        assert!(sanitize_card_number("4111x1111x1111x1111").is_none());
    }

    #[test]
    fn card_payment_marks_appointment_paid() {
        let mut f = fixture();
        let actor = f.patient_actor;
        let payment = initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("4111111111111111"),
        )
        .unwrap();

        assert_eq!(payment.status, PaymentState::Completed);
        assert_eq!(payment.amount_cents, 7500);
        assert_eq!(payment.card_last_four.as_deref(), Some("1111"));
        assert!(payment.transaction_id.unwrap().starts_with("TXN-"));

        let appt = repository::get_appointment(&f.conn, &f.appointment_id)
            .unwrap()
            .unwrap();
        assert_eq!(appt.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn rejected_card_leaves_no_state() {
        let mut f = fixture();
        let actor = f.patient_actor;
        let err = initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("1234"),
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::PaymentRejected));

        assert!(repository::get_payment_by_appointment(&f.conn, &f.appointment_id)
            .unwrap()
            .is_none());
        let appt = repository::get_appointment(&f.conn, &f.appointment_id)
            .unwrap()
            .unwrap();
        assert_eq!(appt.payment_status, PaymentStatus::Pending);

        // Retry with a corrected number succeeds
        assert!(initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("4111 1111 1111 1111"),
        )
        .is_ok());
    }

    #[test]
    fn cash_payment_stays_deferred() {
        let mut f = fixture();
        let actor = f.patient_actor;
        let payment = initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Cash,
            None,
        )
        .unwrap();

        assert_eq!(payment.status, PaymentState::Pending);
        assert_eq!(payment.card_last_four.as_deref(), Some("0000"));
        assert!(payment.transaction_id.unwrap().starts_with("CASH-"));

        // Appointment remains pending until settled at the facility
        let appt = repository::get_appointment(&f.conn, &f.appointment_id)
            .unwrap()
            .unwrap();
        assert_eq!(appt.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn second_initiation_reuses_the_row() {
        let mut f = fixture();
        let actor = f.patient_actor;
        let first = initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Cash,
            None,
        )
        .unwrap();

        // Cash then card: same row upgraded, not duplicated
        let second = initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("4111111111111111"),
        )
        .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.method, PaymentMethod::Card);
        assert_eq!(second.status, PaymentState::Completed);

        let count: i64 = f
            .conn
            .query_row(
                "SELECT COUNT(*) FROM payments WHERE appointment_id = ?1",
                rusqlite::params![f.appointment_id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn already_paid_is_rejected_without_mutation() {
        let mut f = fixture();
        let actor = f.patient_actor;
        initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("4111111111111111"),
        )
        .unwrap();

        let err = initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("4111111111111111"),
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::AlreadyPaid));
    }

    #[test]
    fn fee_is_read_at_payment_time() {
        let mut f = fixture();
        // Fee changes between booking and payment
        f.conn
            .execute(
                "UPDATE doctors SET consultation_fee_cents = 9900 WHERE id = ?1",
                rusqlite::params![f.doctor.id.to_string()],
            )
            .unwrap();

        let actor = f.patient_actor;
        let payment = initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("4111111111111111"),
        )
        .unwrap();
        assert_eq!(payment.amount_cents, 9900);
    }

    #[test]
    fn payment_authorization() {
        let mut f = fixture();

        let doctor_actor = ActingIdentity::doctor(f.doctor.user_id);
        let err = initiate(
            &mut f.conn,
            &doctor_actor,
            &f.appointment_id,
            PaymentMethod::Cash,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::Forbidden));

        let stranger = ActingIdentity::patient(Uuid::new_v4());
        let err = initiate(
            &mut f.conn,
            &stranger,
            &f.appointment_id,
            PaymentMethod::Cash,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::Forbidden));

        let admin = ActingIdentity::admin(Uuid::new_v4());
        assert!(initiate(
            &mut f.conn,
            &admin,
            &f.appointment_id,
            PaymentMethod::Cash,
            None
        )
        .is_ok());
    }

    #[test]
    fn refund_requires_completed_payment() {
        let mut f = fixture();
        let actor = f.patient_actor;

        // No payment yet
        let err = refund(&mut f.conn, &actor, &f.appointment_id).unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));

        // Pending cash payment cannot be refunded
        initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Cash,
            None,
        )
        .unwrap();
        let err = refund(&mut f.conn, &actor, &f.appointment_id).unwrap_err();
        assert!(matches!(err, BookingError::InvalidTransition { .. }));
        let unchanged = repository::get_payment_by_appointment(&f.conn, &f.appointment_id)
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.status, PaymentState::Pending);

        // Completed card payment refunds
        initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("4111111111111111"),
        )
        .unwrap();
        let refunded = refund(&mut f.conn, &actor, &f.appointment_id).unwrap();
        assert_eq!(refunded.status, PaymentState::Refunded);

        let appt = repository::get_appointment(&f.conn, &f.appointment_id)
            .unwrap()
            .unwrap();
        assert_eq!(appt.payment_status, PaymentStatus::Refunded);
    }

    #[test]
    fn refund_does_not_cancel_the_appointment() {
        let mut f = fixture();
        let actor = f.patient_actor;
        initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("4111111111111111"),
        )
        .unwrap();
        refund(&mut f.conn, &actor, &f.appointment_id).unwrap();

        let appt = repository::get_appointment(&f.conn, &f.appointment_id)
            .unwrap()
            .unwrap();
        assert_eq!(
            appt.status,
            crate::models::enums::AppointmentStatus::Pending,
            "refund must not touch the lifecycle status"
        );
    }

    #[test]
    fn cancelling_does_not_refund() {
        let mut f = fixture();
        let actor = f.patient_actor;
        initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Card,
            Some("4111111111111111"),
        )
        .unwrap();

        booking::cancel(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            &RecordingNotifier::default(),
        )
        .unwrap();

        let payment = repository::get_payment_by_appointment(&f.conn, &f.appointment_id)
            .unwrap()
            .unwrap();
        assert_eq!(payment.status, PaymentState::Completed);
    }

    #[test]
    fn payment_lookup_is_scoped() {
        let mut f = fixture();
        let actor = f.patient_actor;
        initiate(
            &mut f.conn,
            &actor,
            &f.appointment_id,
            PaymentMethod::Cash,
            None,
        )
        .unwrap();

        assert!(get_for(&f.conn, &actor, &f.appointment_id).unwrap().is_some());
        let doctor_actor = ActingIdentity::doctor(f.doctor.user_id);
        assert!(get_for(&f.conn, &doctor_actor, &f.appointment_id)
            .unwrap()
            .is_some());
        let stranger = ActingIdentity::doctor(Uuid::new_v4());
        assert!(matches!(
            get_for(&f.conn, &stranger, &f.appointment_id),
            Err(BookingError::Forbidden)
        ));
    }
}
