//! Slot calendar — the fixed time-slot catalog and availability queries.
//!
//! Slots are discrete labels, not durations: 30-minute steps from 09:00
//! with a midday gap, ending at 17:00. The same catalog feeds the booking
//! form and the booking engine's authoritative conflict check.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::repository;
use crate::error::BookingError;

/// Fixed slot catalog: (label, display) pairs in booking-form order.
pub const SLOT_CATALOG: &[(&str, &str)] = &[
    ("09:00", "09:00 AM"),
    ("09:30", "09:30 AM"),
    ("10:00", "10:00 AM"),
    ("10:30", "10:30 AM"),
    ("11:00", "11:00 AM"),
    ("11:30", "11:30 AM"),
    ("12:00", "12:00 PM"),
    ("14:00", "02:00 PM"),
    ("14:30", "02:30 PM"),
    ("15:00", "03:00 PM"),
    ("15:30", "03:30 PM"),
    ("16:00", "04:00 PM"),
    ("16:30", "04:30 PM"),
    ("17:00", "05:00 PM"),
];

/// Date-range queries are capped to keep result sizes bounded.
pub const MAX_RANGE_DAYS: i64 = 30;

/// Whether a time label names a catalog slot.
pub fn is_catalog_slot(label: &str) -> bool {
    SLOT_CATALOG.iter().any(|(slot, _)| *slot == label)
}

/// 12-hour display form of a catalog label.
pub fn slot_display(label: &str) -> Option<&'static str> {
    SLOT_CATALOG
        .iter()
        .find(|(slot, _)| *slot == label)
        .map(|(_, display)| *display)
}

/// One slot with its display label and availability flag.
#[derive(Debug, Clone, Serialize)]
pub struct SlotAvailability {
    pub value: String,
    pub display: String,
    pub available: bool,
}

fn require_doctor(conn: &Connection, doctor_id: &Uuid) -> Result<(), BookingError> {
    repository::get_doctor(conn, doctor_id)?
        .ok_or_else(|| BookingError::not_found("Doctor", doctor_id))?;
    Ok(())
}

/// Time labels held by non-cancelled appointments for a doctor on a date.
pub fn occupied_slots(
    conn: &Connection,
    doctor_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<String>, BookingError> {
    require_doctor(conn, doctor_id)?;
    Ok(repository::occupied_times(conn, doctor_id, date)?)
}

/// Catalog minus occupied, preserving catalog order.
pub fn available_slots(
    conn: &Connection,
    doctor_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<String>, BookingError> {
    let occupied = occupied_slots(conn, doctor_id, date)?;
    Ok(SLOT_CATALOG
        .iter()
        .map(|(slot, _)| slot.to_string())
        .filter(|slot| !occupied.contains(slot))
        .collect())
}

/// Full per-slot availability for one date, in catalog order.
pub fn day_schedule(
    conn: &Connection,
    doctor_id: &Uuid,
    date: NaiveDate,
) -> Result<Vec<SlotAvailability>, BookingError> {
    let occupied = occupied_slots(conn, doctor_id, date)?;
    Ok(SLOT_CATALOG
        .iter()
        .map(|(slot, display)| SlotAvailability {
            value: slot.to_string(),
            display: display.to_string(),
            available: !occupied.contains(&slot.to_string()),
        })
        .collect())
}

/// Occupied slots per date over an inclusive range, capped at
/// `MAX_RANGE_DAYS`. Dates without bookings are absent from the map.
pub fn booked_slots_in_range(
    conn: &Connection,
    doctor_id: &Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<BTreeMap<NaiveDate, Vec<String>>, BookingError> {
    if to < from {
        return Err(BookingError::Validation(
            "range end precedes range start".into(),
        ));
    }
    if (to - from).num_days() > MAX_RANGE_DAYS {
        return Err(BookingError::Validation(format!(
            "date range is capped at {MAX_RANGE_DAYS} days"
        )));
    }
    require_doctor(conn, doctor_id)?;

    let mut booked: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    for (date, time) in repository::occupied_in_range(conn, doctor_id, from, to)? {
        booked.entry(date).or_default().push(time);
    }
    Ok(booked)
}
