//! Day-level navigation over a weekly schedule.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::schedule::WeeklySchedule;
use crate::slots::{generate, SlotDuration, TimeSlot};

/// Slots for one civil date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

/// Nearest date strictly after `from` on which the clinic has a window.
///
/// Looks at most `horizon_days` ahead; `None` when nothing opens in that span.
pub fn next_open_date(
    from: NaiveDate,
    schedule: &WeeklySchedule,
    horizon_days: u32,
) -> Option<NaiveDate> {
    (1..=u64::from(horizon_days))
        .filter_map(|n| from.checked_add_days(Days::new(n)))
        .find(|d| schedule.is_open(d.weekday()))
}

/// Nearest date strictly before `from` on which the clinic has a window.
pub fn previous_open_date(
    from: NaiveDate,
    schedule: &WeeklySchedule,
    horizon_days: u32,
) -> Option<NaiveDate> {
    (1..=u64::from(horizon_days))
        .filter_map(|n| from.checked_sub_days(Days::new(n)))
        .find(|d| schedule.is_open(d.weekday()))
}

/// Generate slots for `days` consecutive dates starting at `start_date`.
///
/// Closed days are included with an empty slot list so the result lines up
/// with a calendar strip.
pub fn generate_range(
    start_date: NaiveDate,
    days: u32,
    duration: SlotDuration,
    now: DateTime<Utc>,
    schedule: &WeeklySchedule,
    zone: Tz,
) -> Vec<DaySlots> {
    (0..u64::from(days))
        .filter_map(|n| start_date.checked_add_days(Days::new(n)))
        .map(|date| DaySlots {
            date,
            slots: generate(date, duration, now, schedule, zone),
        })
        .collect()
}
