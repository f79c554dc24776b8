//! Repository layer — entity-scoped database operations.
//!
//! All public functions are re-exported here so callers can use
//! `crate::db::repository::*`.

mod appointment;
mod department;
mod doctor;
mod medical_record;
mod patient;
mod payment;

pub use appointment::*;
pub use department::*;
pub use doctor::*;
pub use medical_record::*;
pub use patient::*;
pub use payment::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::enums::*;
    use crate::models::*;
    use chrono::{Local, NaiveDate};
    use rusqlite::Connection;
    use uuid::Uuid;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_department(conn: &Connection, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        insert_department(
            conn,
            &Department {
                id,
                name: name.into(),
                description: String::new(),
                icon: "fa-hospital".into(),
                created_at: Local::now().naive_local(),
            },
        )
        .unwrap();
        id
    }

    fn make_doctor(conn: &Connection, department_id: Option<Uuid>) -> Doctor {
        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            department_id,
            specialization: "Cardiology".into(),
            experience_years: 10,
            bio: String::new(),
            consultation_fee_cents: 7500,
            is_available: true,
        };
        insert_doctor(conn, &doctor).unwrap();
        doctor
    }

    fn make_patient(conn: &Connection) -> Patient {
        let patient = Patient {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 3, 12),
            blood_type: Some(BloodType::OPositive),
            address: "12 Elm Street".into(),
            emergency_contact: String::new(),
            emergency_phone: String::new(),
            medical_notes: String::new(),
        };
        insert_patient(conn, &patient).unwrap();
        patient
    }

    fn make_appointment(
        conn: &Connection,
        doctor_id: Uuid,
        patient_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let now = Local::now().naive_local();
        insert_appointment(
            conn,
            &Appointment {
                id,
                doctor_id,
                patient_id,
                date,
                time: time.into(),
                status: AppointmentStatus::Pending,
                payment_status: PaymentStatus::Pending,
                is_video: false,
                description: "checkup".into(),
                created_at: now,
                updated_at: now,
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn department_insert_and_list_with_counts() {
        let conn = test_db();
        let cardio = make_department(&conn, "Cardiology");
        make_department(&conn, "Neurology");
        make_doctor(&conn, Some(cardio));
        make_doctor(&conn, Some(cardio));

        let listed = list_departments(&conn).unwrap();
        assert_eq!(listed.len(), 2);
        // Alphabetical: Cardiology first
        assert_eq!(listed[0].0.name, "Cardiology");
        assert_eq!(listed[0].1, 2);
        assert_eq!(listed[1].0.name, "Neurology");
        assert_eq!(listed[1].1, 0);
    }

    #[test]
    fn department_name_is_unique() {
        let conn = test_db();
        make_department(&conn, "Cardiology");
        let duplicate = insert_department(
            &conn,
            &Department {
                id: Uuid::new_v4(),
                name: "Cardiology".into(),
                description: String::new(),
                icon: "fa-hospital".into(),
                created_at: Local::now().naive_local(),
            },
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn deleting_department_detaches_doctors() {
        let conn = test_db();
        let dept = make_department(&conn, "Dermatology");
        let doctor = make_doctor(&conn, Some(dept));

        delete_department(&conn, &dept).unwrap();

        let detached = get_doctor(&conn, &doctor.id).unwrap().unwrap();
        assert!(detached.department_id.is_none());
    }

    #[test]
    fn delete_missing_department_is_not_found() {
        let conn = test_db();
        let err = delete_department(&conn, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn doctor_lookup_by_user_identity() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);

        let found = get_doctor_by_user(&conn, &doctor.user_id).unwrap().unwrap();
        assert_eq!(found.id, doctor.id);
        assert!(get_doctor_by_user(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn doctor_search_filters_department_and_specialization() {
        let conn = test_db();
        let cardio = make_department(&conn, "Cardiology");
        let neuro = make_department(&conn, "Neurology");
        make_doctor(&conn, Some(cardio));
        let neurologist = Doctor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            department_id: Some(neuro),
            specialization: "Neurosurgery".into(),
            experience_years: 4,
            bio: String::new(),
            consultation_fee_cents: 12000,
            is_available: true,
        };
        insert_doctor(&conn, &neurologist).unwrap();

        let by_dept = search_doctors(&conn, Some(&cardio), None).unwrap();
        assert_eq!(by_dept.len(), 1);
        assert_eq!(by_dept[0].specialization, "Cardiology");

        let by_term = search_doctors(&conn, None, Some("neuro")).unwrap();
        assert_eq!(by_term.len(), 1);
        assert_eq!(by_term[0].specialization, "Neurosurgery");

        // Unavailable doctors never show up
        set_doctor_availability(&conn, &neurologist.id, false).unwrap();
        assert!(search_doctors(&conn, None, Some("neuro")).unwrap().is_empty());
    }

    #[test]
    fn patient_round_trip_preserves_blood_type() {
        let conn = test_db();
        let patient = make_patient(&conn);

        let found = get_patient(&conn, &patient.id).unwrap().unwrap();
        assert_eq!(found.blood_type, Some(BloodType::OPositive));
        assert_eq!(found.date_of_birth, NaiveDate::from_ymd_opt(1988, 3, 12));

        let by_user = get_patient_by_user(&conn, &patient.user_id).unwrap().unwrap();
        assert_eq!(by_user.id, patient.id);
    }

    #[test]
    fn appointment_requires_existing_doctor_and_patient() {
        let conn = test_db();
        let now = Local::now().naive_local();
        let orphan = insert_appointment(
            &conn,
            &Appointment {
                id: Uuid::new_v4(),
                doctor_id: Uuid::new_v4(),
                patient_id: Uuid::new_v4(),
                date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                time: "09:00".into(),
                status: AppointmentStatus::Pending,
                payment_status: PaymentStatus::Pending,
                is_video: false,
                description: String::new(),
                created_at: now,
                updated_at: now,
            },
        );
        assert!(orphan.is_err());
    }

    #[test]
    fn slot_index_rejects_duplicate_live_booking() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);
        let p1 = make_patient(&conn);
        let p2 = make_patient(&conn);
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

        make_appointment(&conn, doctor.id, p1.id, date, "10:00");

        let now = Local::now().naive_local();
        let duplicate = insert_appointment(
            &conn,
            &Appointment {
                id: Uuid::new_v4(),
                doctor_id: doctor.id,
                patient_id: p2.id,
                date,
                time: "10:00".into(),
                status: AppointmentStatus::Pending,
                payment_status: PaymentStatus::Pending,
                is_video: false,
                description: String::new(),
                created_at: now,
                updated_at: now,
            },
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn cancelled_booking_frees_slot_for_reinsert() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);
        let p1 = make_patient(&conn);
        let p2 = make_patient(&conn);
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();

        let first = make_appointment(&conn, doctor.id, p1.id, date, "10:00");
        set_appointment_status(&conn, &first, AppointmentStatus::Cancelled).unwrap();

        // Same slot can now be booked again
        make_appointment(&conn, doctor.id, p2.id, date, "10:00");
        let occupied = occupied_times(&conn, &doctor.id, date).unwrap();
        assert_eq!(occupied, vec!["10:00"]);
    }

    #[test]
    fn occupied_times_excludes_cancelled() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);
        let patient = make_patient(&conn);
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        make_appointment(&conn, doctor.id, patient.id, date, "09:30");
        let cancelled = make_appointment(&conn, doctor.id, patient.id, date, "11:00");
        set_appointment_status(&conn, &cancelled, AppointmentStatus::Cancelled).unwrap();

        let occupied = occupied_times(&conn, &doctor.id, date).unwrap();
        assert_eq!(occupied, vec!["09:30"]);
    }

    #[test]
    fn occupied_in_range_is_inclusive_and_ordered() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);
        let patient = make_patient(&conn);
        let d1 = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();

        make_appointment(&conn, doctor.id, patient.id, d2, "09:00");
        make_appointment(&conn, doctor.id, patient.id, d1, "14:00");
        // Outside the range
        make_appointment(
            &conn,
            doctor.id,
            patient.id,
            NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            "09:00",
        );

        let occupied = occupied_in_range(&conn, &doctor.id, d1, d2).unwrap();
        assert_eq!(
            occupied,
            vec![(d1, "14:00".to_string()), (d2, "09:00".to_string())]
        );
    }

    #[test]
    fn status_update_on_missing_appointment_is_not_found() {
        let conn = test_db();
        let err =
            set_appointment_status(&conn, &Uuid::new_v4(), AppointmentStatus::Confirmed)
                .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn one_payment_row_per_appointment() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);
        let patient = make_patient(&conn);
        let appt = make_appointment(
            &conn,
            doctor.id,
            patient.id,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            "09:00",
        );

        let now = Local::now().naive_local();
        let payment = Payment {
            id: Uuid::new_v4(),
            appointment_id: appt,
            amount_cents: 7500,
            status: PaymentState::Pending,
            method: PaymentMethod::Card,
            transaction_id: None,
            card_last_four: None,
            created_at: now,
            updated_at: now,
        };
        insert_payment(&conn, &payment).unwrap();

        let second = Payment {
            id: Uuid::new_v4(),
            ..payment.clone()
        };
        assert!(insert_payment(&conn, &second).is_err());

        let found = get_payment_by_appointment(&conn, &appt).unwrap().unwrap();
        assert_eq!(found.id, payment.id);
    }

    #[test]
    fn payment_update_rewrites_fields() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);
        let patient = make_patient(&conn);
        let appt = make_appointment(
            &conn,
            doctor.id,
            patient.id,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            "09:00",
        );

        let now = Local::now().naive_local();
        let mut payment = Payment {
            id: Uuid::new_v4(),
            appointment_id: appt,
            amount_cents: 7500,
            status: PaymentState::Pending,
            method: PaymentMethod::Card,
            transaction_id: None,
            card_last_four: None,
            created_at: now,
            updated_at: now,
        };
        insert_payment(&conn, &payment).unwrap();

        payment.status = PaymentState::Completed;
        payment.transaction_id = Some("TXN-ABCDEF123456".into());
        payment.card_last_four = Some("1111".into());
        update_payment(&conn, &payment).unwrap();

        let found = get_payment_by_appointment(&conn, &appt).unwrap().unwrap();
        assert_eq!(found.status, PaymentState::Completed);
        assert_eq!(found.transaction_id.as_deref(), Some("TXN-ABCDEF123456"));
        assert_eq!(found.card_last_four.as_deref(), Some("1111"));
    }

    #[test]
    fn records_for_patient_newest_first() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);
        let patient = make_patient(&conn);
        let a1 = make_appointment(
            &conn,
            doctor.id,
            patient.id,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            "09:00",
        );
        let a2 = make_appointment(
            &conn,
            doctor.id,
            patient.id,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            "09:00",
        );

        let older = chrono::NaiveDateTime::parse_from_str(
            "2025-05-01 10:00:00",
            "%Y-%m-%d %H:%M:%S",
        )
        .unwrap();
        let newer = chrono::NaiveDateTime::parse_from_str(
            "2025-06-01 10:00:00",
            "%Y-%m-%d %H:%M:%S",
        )
        .unwrap();

        for (appt, diagnosis, at) in [(a1, "Flu", older), (a2, "Follow-up", newer)] {
            insert_medical_record(
                &conn,
                &MedicalRecord {
                    id: Uuid::new_v4(),
                    appointment_id: appt,
                    diagnosis: diagnosis.into(),
                    symptoms: String::new(),
                    medicines: "Paracetamol".into(),
                    instructions: String::new(),
                    follow_up_date: None,
                    created_at: at,
                    updated_at: at,
                },
            )
            .unwrap();
        }

        let records = records_for_patient(&conn, &patient.id).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].diagnosis, "Follow-up");
        assert_eq!(records[1].diagnosis, "Flu");

        let per_appt = records_for_appointment(&conn, &a1).unwrap();
        assert_eq!(per_appt.len(), 1);
        assert_eq!(per_appt[0].diagnosis, "Flu");
    }

    #[test]
    fn multiple_records_per_appointment_allowed() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);
        let patient = make_patient(&conn);
        let appt = make_appointment(
            &conn,
            doctor.id,
            patient.id,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            "09:00",
        );

        for diagnosis in ["Initial", "Amended"] {
            let now = Local::now().naive_local();
            insert_medical_record(
                &conn,
                &MedicalRecord {
                    id: Uuid::new_v4(),
                    appointment_id: appt,
                    diagnosis: diagnosis.into(),
                    symptoms: String::new(),
                    medicines: "Rest".into(),
                    instructions: String::new(),
                    follow_up_date: None,
                    created_at: now,
                    updated_at: now,
                },
            )
            .unwrap();
        }

        assert_eq!(records_for_appointment(&conn, &appt).unwrap().len(), 2);
    }

    #[test]
    fn overview_counts() {
        let conn = test_db();
        let doctor = make_doctor(&conn, None);
        let patient = make_patient(&conn);
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        make_appointment(&conn, doctor.id, patient.id, today, "09:00");
        let confirmed = make_appointment(&conn, doctor.id, patient.id, today, "09:30");
        set_appointment_status(&conn, &confirmed, AppointmentStatus::Confirmed).unwrap();

        assert_eq!(count_doctors(&conn).unwrap(), 1);
        assert_eq!(count_patients(&conn).unwrap(), 1);
        assert_eq!(count_departments(&conn).unwrap(), 0);
        assert_eq!(count_appointments(&conn).unwrap(), 2);
        assert_eq!(count_appointments_on(&conn, today).unwrap(), 2);
        assert_eq!(
            count_appointments_with_status(&conn, AppointmentStatus::Pending).unwrap(),
            1
        );
    }
}
