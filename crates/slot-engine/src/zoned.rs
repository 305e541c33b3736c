//! Zone-local wall clock ↔ absolute instant conversion.
//!
//! Every conversion looks up the UTC offset valid for the specific civil date
//! being resolved. Nothing here caches an offset, so two wall-clock times on
//! either side of a DST transition resolve with different offsets.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{Result, SlotError};

/// Minutes in a civil day. A window may end at exactly this value (24:00).
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Upper bound when searching for the end of a DST gap. Real gaps are one or
/// two hours; a whole skipped day (Pacific/Apia, 2011) is the worst case.
const MAX_GAP_MINUTES: i64 = 26 * 60;

/// Policy for wall-clock times that fall inside a DST gap.
///
/// Ambiguous times (the repeated hour when clocks fall back) always resolve to
/// the earlier of the two instants, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Nonexistent local times produce no instant.
    #[default]
    Skip,
    /// Move to the first valid instant after the gap (e.g. 02:30 → 03:00).
    ShiftForward,
    /// Keep the wall-clock reading and apply the offset in force before the
    /// gap (e.g. 02:30 EST-reckoned → 03:30 EDT).
    WallClock,
}

/// Parse an IANA timezone identifier such as `America/New_York`.
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}

/// Parse a civil date in `YYYY-MM-DD` form.
pub fn parse_civil_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| SlotError::InvalidDate(format!("'{}': {}", text, e)))
}

/// The calendar date an instant falls on, as observed in `zone`.
///
/// An instant at UTC midnight is still the previous evening in New York; the
/// booking day is always the zone's day, never UTC's or the caller's.
pub fn civil_date_in_zone(instant: DateTime<Utc>, zone: Tz) -> NaiveDate {
    instant.with_timezone(&zone).date_naive()
}

/// Naive wall-clock time for `minute_of_day` minutes after `date`'s midnight.
///
/// `MINUTES_PER_DAY` maps to the following day's 00:00. `None` when the
/// reading is past the last representable date.
pub fn wall_clock(date: NaiveDate, minute_of_day: u32) -> Option<NaiveDateTime> {
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::minutes(i64::from(minute_of_day)))
}

/// Resolve a zone-local wall-clock reading on `date` to an absolute instant.
///
/// Returns `None` when the reading is inside a DST gap and `policy` is
/// [`DstPolicy::Skip`], when the gap cannot be bridged, or when the reading
/// falls outside chrono's representable range.
pub fn resolve_local(
    date: NaiveDate,
    minute_of_day: u32,
    zone: Tz,
    policy: DstPolicy,
) -> Option<DateTime<Utc>> {
    let local = wall_clock(date, minute_of_day)?;
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Some(earlier.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => first_instant_after_gap(local, zone),
            DstPolicy::WallClock => {
                let before = offset_before_gap(local, zone)?;
                local
                    .checked_sub_signed(Duration::seconds(i64::from(before.local_minus_utc())))
                    .map(|utc| Utc.from_utc_datetime(&utc))
            }
        },
    }
}

/// The UTC offset in force at a wall-clock reading on `date`.
///
/// Ambiguous readings report the earlier instant's offset; gap readings have
/// no offset.
pub fn utc_offset_on(date: NaiveDate, minute_of_day: u32, zone: Tz) -> Option<FixedOffset> {
    zone.from_local_datetime(&wall_clock(date, minute_of_day)?)
        .earliest()
        .map(|dt| dt.offset().fix())
}

/// Minutes between `anchor`'s local midnight and `instant`'s local reading.
///
/// The result exceeds `MINUTES_PER_DAY` for readings on the following day and
/// is negative for readings before `anchor`.
pub fn local_minute_of_day(instant: DateTime<Utc>, zone: Tz, anchor: NaiveDate) -> i64 {
    let local = instant.with_timezone(&zone).naive_local();
    (local - anchor.and_time(NaiveTime::MIN)).num_minutes()
}

fn first_instant_after_gap(local: NaiveDateTime, zone: Tz) -> Option<DateTime<Utc>> {
    (1..=MAX_GAP_MINUTES)
        .filter_map(|step| local.checked_add_signed(Duration::minutes(step)))
        .find_map(|later| zone.from_local_datetime(&later).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

fn offset_before_gap(local: NaiveDateTime, zone: Tz) -> Option<FixedOffset> {
    (1..=MAX_GAP_MINUTES)
        .filter_map(|step| local.checked_sub_signed(Duration::minutes(step)))
        .find_map(|earlier| zone.from_local_datetime(&earlier).latest())
        .map(|dt| dt.offset().fix())
}
