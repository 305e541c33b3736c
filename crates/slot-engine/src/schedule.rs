//! Weekly opening windows, expressed in zone-local clock hours.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::zoned::MINUTES_PER_DAY;

/// A half-open `[start, end)` interval of a civil day, in minutes after local
/// midnight. `end` may be `MINUTES_PER_DAY` (24:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WindowHours", into = "WindowHours")]
pub struct Window {
    start_minute: u32,
    end_minute: u32,
}

/// Wire form of a window: fractional clock hours, e.g. `{"start": 2, "end": 7.5}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WindowHours {
    start: f64,
    end: f64,
}

impl Window {
    pub fn new(start_minute: u32, end_minute: u32) -> Result<Self> {
        if start_minute >= end_minute || end_minute > MINUTES_PER_DAY {
            return Err(SlotError::InvalidWindow(format!(
                "[{}, {}) minutes is not a non-empty interval within one day",
                start_minute, end_minute
            )));
        }
        Ok(Self {
            start_minute,
            end_minute,
        })
    }

    /// Build a window from clock hours. Fractions must land on whole minutes.
    pub fn from_hours(start: f64, end: f64) -> Result<Self> {
        Self::new(hours_to_minutes(start)?, hours_to_minutes(end)?)
    }

    pub fn start_minute(&self) -> u32 {
        self.start_minute
    }

    pub fn end_minute(&self) -> u32 {
        self.end_minute
    }

    /// Whether a slot read as `start`/`end` local minutes fits this window.
    ///
    /// The two readings are checked independently. On a fall-back day a slot
    /// can end at an earlier wall-clock reading than it started.
    pub fn contains_span(&self, start: i64, end: i64) -> bool {
        start >= i64::from(self.start_minute) && end <= i64::from(self.end_minute)
    }
}

fn hours_to_minutes(hours: f64) -> Result<u32> {
    let minutes = hours * 60.0;
    let rounded = minutes.round();
    if !hours.is_finite() || (minutes - rounded).abs() > 1e-6 || rounded < 0.0 {
        return Err(SlotError::InvalidWindow(format!(
            "{} is not a whole-minute clock hour",
            hours
        )));
    }
    Ok(rounded as u32)
}

impl TryFrom<WindowHours> for Window {
    type Error = SlotError;

    fn try_from(raw: WindowHours) -> Result<Self> {
        Window::from_hours(raw.start, raw.end)
    }
}

impl From<Window> for WindowHours {
    fn from(w: Window) -> Self {
        Self {
            start: f64::from(w.start_minute) / 60.0,
            end: f64::from(w.end_minute) / 60.0,
        }
    }
}

/// Opening windows for each day of the week.
///
/// Windows within a day are sorted and pairwise disjoint; touching windows
/// (`[2, 11)` then `[11, 14)`) are allowed and stay separate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ScheduleTable", into = "ScheduleTable")]
pub struct WeeklySchedule {
    days: [Vec<Window>; 7],
}

/// Wire form: one optional list per weekday, missing days are closed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ScheduleTable {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    monday: Vec<Window>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tuesday: Vec<Window>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    wednesday: Vec<Window>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    thursday: Vec<Window>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    friday: Vec<Window>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    saturday: Vec<Window>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sunday: Vec<Window>,
}

impl WeeklySchedule {
    /// A schedule with every day closed.
    pub fn closed() -> Self {
        Self::default()
    }

    /// The clinic's hours in `America/New_York`.
    ///
    /// | Day | Windows |
    /// |-----|---------|
    /// | Mon | 02:00–11:00 |
    /// | Tue–Thu | 02:00–14:00 |
    /// | Fri | 02:00–07:00, 11:00–14:00 |
    /// | Sat, Sun | closed |
    pub fn clinic_default() -> Self {
        let hours = |s: u32, e: u32| Window {
            start_minute: s * 60,
            end_minute: e * 60,
        };
        let mut days: [Vec<Window>; 7] = Default::default();
        days[0] = vec![hours(2, 11)];
        days[1] = vec![hours(2, 14)];
        days[2] = vec![hours(2, 14)];
        days[3] = vec![hours(2, 14)];
        days[4] = vec![hours(2, 7), hours(11, 14)];
        Self { days }
    }

    /// Replace one day's windows, validating order and disjointness.
    pub fn with_day(mut self, weekday: Weekday, windows: Vec<Window>) -> Result<Self> {
        validate_day(weekday, &windows)?;
        self.days[weekday.num_days_from_monday() as usize] = windows;
        Ok(self)
    }

    /// Parse a schedule table from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SlotError::InvalidSchedule(e.to_string()))
    }

    pub fn windows(&self, weekday: Weekday) -> &[Window] {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    pub fn is_open(&self, weekday: Weekday) -> bool {
        !self.windows(weekday).is_empty()
    }

    /// True when no day of the week has a window.
    pub fn is_closed_all_week(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }
}

fn validate_day(weekday: Weekday, windows: &[Window]) -> Result<()> {
    for pair in windows.windows(2) {
        if pair[0].end_minute > pair[1].start_minute {
            return Err(SlotError::InvalidSchedule(format!(
                "{} windows overlap or are out of order: [{}, {}) then [{}, {})",
                weekday,
                pair[0].start_minute,
                pair[0].end_minute,
                pair[1].start_minute,
                pair[1].end_minute
            )));
        }
    }
    Ok(())
}

impl TryFrom<ScheduleTable> for WeeklySchedule {
    type Error = SlotError;

    fn try_from(t: ScheduleTable) -> Result<Self> {
        WeeklySchedule::closed()
            .with_day(Weekday::Mon, t.monday)?
            .with_day(Weekday::Tue, t.tuesday)?
            .with_day(Weekday::Wed, t.wednesday)?
            .with_day(Weekday::Thu, t.thursday)?
            .with_day(Weekday::Fri, t.friday)?
            .with_day(Weekday::Sat, t.saturday)?
            .with_day(Weekday::Sun, t.sunday)
    }
}

impl From<WeeklySchedule> for ScheduleTable {
    fn from(s: WeeklySchedule) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = s.days;
        Self {
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        }
    }
}
