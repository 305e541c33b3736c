//! Overlay existing bookings onto generated slots.
//!
//! Booked appointments come from the persistence layer as a start instant and
//! a length. A slot that overlaps any of them is kept in the listing but
//! marked unavailable. Adjacent intervals (one ends exactly when the other
//! starts) are NOT conflicts.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::schedule::WeeklySchedule;
use crate::slots::{generate, SlotDuration, TimeSlot};

/// An interval already taken by a persisted appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookedInterval {
    pub fn new(start: DateTime<Utc>, duration_minutes: u32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(i64::from(duration_minutes)),
        }
    }
}

/// A generated slot that collides with a booking.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotConflict {
    pub slot: TimeSlot,
    pub booking: BookedInterval,
    pub overlap_minutes: i64,
}

/// Find every (slot, booking) pair whose intervals overlap.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn find_conflicts(slots: &[TimeSlot], booked: &[BookedInterval]) -> Vec<SlotConflict> {
    let mut conflicts = Vec::new();

    for slot in slots {
        for booking in booked {
            if slot.overlaps(booking.start, booking.end) {
                let overlap_start = slot.start.max(booking.start);
                let overlap_end = slot.end.min(booking.end);
                conflicts.push(SlotConflict {
                    slot: slot.clone(),
                    booking: booking.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    conflicts
}

/// Copy `slots`, clearing `available` on every slot that overlaps a booking.
///
/// Order and length of the input are preserved.
pub fn mark_booked(slots: &[TimeSlot], booked: &[BookedInterval]) -> Vec<TimeSlot> {
    slots
        .iter()
        .map(|slot| {
            let taken = booked.iter().any(|b| slot.overlaps(b.start, b.end));
            TimeSlot {
                available: slot.available && !taken,
                ..slot.clone()
            }
        })
        .collect()
}

/// Check a user's chosen start against a fresh generation for `date`.
///
/// Returns the matching slot so the caller can hand it to the persistence
/// layer. The choice must be one of the generated starts, still in the future
/// relative to `now`, and free of bookings.
///
/// # Errors
/// Returns `SlotError::SlotUnavailable` otherwise.
pub fn validate_choice(
    choice: DateTime<Utc>,
    date: NaiveDate,
    duration: SlotDuration,
    now: DateTime<Utc>,
    schedule: &WeeklySchedule,
    zone: Tz,
    booked: &[BookedInterval],
) -> Result<TimeSlot> {
    let slots = mark_booked(&generate(date, duration, now, schedule, zone), booked);
    match slots.into_iter().find(|s| s.start == choice) {
        Some(slot) if slot.available => Ok(slot),
        Some(_) => Err(SlotError::SlotUnavailable(format!(
            "{} is already booked",
            choice.to_rfc3339()
        ))),
        None => Err(SlotError::SlotUnavailable(format!(
            "{} is not a bookable {}-minute start on {}",
            choice.to_rfc3339(),
            duration.minutes(),
            date
        ))),
    }
}
