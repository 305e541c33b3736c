//! # slot-engine
//!
//! Appointment slot generation for a clinic that publishes its weekly hours
//! in one IANA time zone.
//!
//! Given a civil date and an appointment length, the engine walks that day's
//! opening windows and returns the bookable intervals as UTC instants. Every
//! wall-clock time is resolved with the UTC offset valid on the date in
//! question, so slots stay pinned to the published local hours across
//! daylight-saving transitions.
//!
//! ## Modules
//!
//! - [`slots`] — (date, duration, now) → ordered bookable slots
//! - [`schedule`] — weekly opening windows, JSON-configurable
//! - [`zoned`] — wall clock ↔ instant conversion and DST gap policies
//! - [`booking`] — overlay persisted bookings, validate a chosen slot
//! - [`calendar`] — next/previous open day, multi-day generation
//! - [`reminder`] — patient reminders and doctor digests from a snapshot
//! - [`error`] — Error types

pub mod booking;
pub mod calendar;
pub mod error;
pub mod reminder;
pub mod schedule;
pub mod slots;
pub mod zoned;

pub use booking::{find_conflicts, mark_booked, validate_choice, BookedInterval};
pub use calendar::{generate_range, next_open_date, previous_open_date, DaySlots};
pub use error::SlotError;
pub use reminder::{plan_notifications, AppointmentRecord, NotificationEvent};
pub use schedule::{WeeklySchedule, Window};
pub use slots::{
    generate, generate_for_instant, generate_from_input, parse_request, SlotDuration, TimeSlot,
};
pub use zoned::DstPolicy;

/// Zone the default clinic schedule is published in.
pub const CLINIC_TIMEZONE: &str = "America/New_York";

/// Parsed form of [`CLINIC_TIMEZONE`].
pub fn clinic_zone() -> chrono_tz::Tz {
    chrono_tz::America::New_York
}
