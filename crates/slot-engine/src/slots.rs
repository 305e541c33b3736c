//! Bookable slot generation -- walks each opening window of a day in fixed
//! duration steps and keeps the slots that fit and are still in the future.
//!
//! Each candidate start is resolved from the zone-local wall clock with the
//! offset valid on the target date, so a 02:00 window start means 02:00 in
//! New York on that date whether New York is on EST or EDT.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, SlotError};
use crate::schedule::{WeeklySchedule, Window};
use crate::zoned::{self, DstPolicy};

/// Appointment lengths the clinic offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SlotDuration {
    Thirty,
    Sixty,
}

impl SlotDuration {
    pub const ALL: [SlotDuration; 2] = [SlotDuration::Thirty, SlotDuration::Sixty];

    pub fn minutes(self) -> u32 {
        match self {
            SlotDuration::Thirty => 30,
            SlotDuration::Sixty => 60,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }
}

impl TryFrom<u32> for SlotDuration {
    type Error = SlotError;

    /// Unsupported lengths are rejected, never rounded to a supported one.
    fn try_from(minutes: u32) -> Result<Self> {
        match minutes {
            30 => Ok(SlotDuration::Thirty),
            60 => Ok(SlotDuration::Sixty),
            other => Err(SlotError::UnsupportedDuration(other)),
        }
    }
}

impl From<SlotDuration> for u32 {
    fn from(d: SlotDuration) -> u32 {
        d.minutes()
    }
}

/// A concrete bookable interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `false` once a booking overlays this slot.
    pub available: bool,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open overlap test; touching intervals do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }

    /// Start time as read on a clock in `zone`.
    pub fn local_start(&self, zone: Tz) -> DateTime<Tz> {
        self.start.with_timezone(&zone)
    }

    pub fn local_end(&self, zone: Tz) -> DateTime<Tz> {
        self.end.with_timezone(&zone)
    }
}

/// Generate the bookable slots for `target_date`.
///
/// `target_date` is a civil date in `zone`; its weekday picks the windows from
/// `schedule`. A candidate is kept when its end, read on the zone's clock, is
/// no later than its window's end and its start is strictly after `now`.
/// Trailing time too short for a full slot is dropped. Wall-clock starts that
/// fall in a DST gap are skipped.
///
/// The result is sorted by start and contains no overlapping slots.
pub fn generate(
    target_date: NaiveDate,
    duration: SlotDuration,
    now: DateTime<Utc>,
    schedule: &WeeklySchedule,
    zone: Tz,
) -> Vec<TimeSlot> {
    let weekday = target_date.weekday();
    let windows = schedule.windows(weekday);
    debug!(
        date = %target_date,
        %weekday,
        windows = windows.len(),
        minutes = duration.minutes(),
        "generating slots"
    );

    let mut slots: Vec<TimeSlot> = windows
        .iter()
        .flat_map(|window| window_slots(target_date, window, duration, now, zone))
        .collect();

    slots.sort_by_key(|s| s.start);
    debug!(date = %target_date, count = slots.len(), "slots generated");
    slots
}

/// Generate slots for the zone-local day that contains `instant`.
///
/// Use this when the caller holds a point in time (for example a date picked
/// in a browser, delivered as UTC midnight) rather than a civil date.
pub fn generate_for_instant(
    instant: DateTime<Utc>,
    duration: SlotDuration,
    now: DateTime<Utc>,
    schedule: &WeeklySchedule,
    zone: Tz,
) -> Vec<TimeSlot> {
    let date = zoned::civil_date_in_zone(instant, zone);
    generate(date, duration, now, schedule, zone)
}

/// Validate the raw parts of a slot request: a `YYYY-MM-DD` date, a minute
/// count and an IANA zone name.
///
/// # Errors
/// - `SlotError::InvalidDate` when `date` does not parse
/// - `SlotError::UnsupportedDuration` for anything other than 30 or 60
/// - `SlotError::InvalidTimezone` for an unknown zone name
pub fn parse_request(
    date: &str,
    duration_minutes: u32,
    zone: &str,
) -> Result<(NaiveDate, SlotDuration, Tz)> {
    let target_date = zoned::parse_civil_date(date)?;
    let duration = SlotDuration::try_from(duration_minutes)?;
    let zone = zoned::parse_zone(zone)?;
    Ok((target_date, duration, zone))
}

/// Generate slots from unvalidated input. See [`parse_request`] for the
/// errors.
pub fn generate_from_input(
    date: &str,
    duration_minutes: u32,
    now: DateTime<Utc>,
    schedule: &WeeklySchedule,
    zone: &str,
) -> Result<Vec<TimeSlot>> {
    let (target_date, duration, zone) = parse_request(date, duration_minutes, zone)?;
    Ok(generate(target_date, duration, now, schedule, zone))
}

fn window_slots(
    date: NaiveDate,
    window: &Window,
    duration: SlotDuration,
    now: DateTime<Utc>,
    zone: Tz,
) -> Vec<TimeSlot> {
    let step = duration.minutes();
    let length = duration.as_duration();
    let mut slots: Vec<TimeSlot> = Vec::new();

    let mut minute = window.start_minute();
    while minute < window.end_minute() {
        let candidate = minute;
        minute += step;

        let Some(start) = zoned::resolve_local(date, candidate, zone, DstPolicy::Skip) else {
            trace!(%date, minute = candidate, "start falls in a DST gap");
            continue;
        };
        let Some(end) = start.checked_add_signed(length) else {
            trace!(%date, %start, "slot end is out of range");
            continue;
        };

        let local_start = zoned::local_minute_of_day(start, zone, date);
        let local_end = zoned::local_minute_of_day(end, zone, date);
        if !window.contains_span(local_start, local_end) {
            trace!(%date, local_start, local_end, "slot spills past its window");
            continue;
        }
        if start <= now {
            trace!(%date, %start, "slot is not in the future");
            continue;
        }
        if slots.last().is_some_and(|prev| prev.end > start) {
            // Slots must stay disjoint in absolute time across DST shifts.
            trace!(%date, %start, "slot overlaps the previous one");
            continue;
        }

        slots.push(TimeSlot {
            start,
            end,
            available: true,
        });
    }

    slots
}
