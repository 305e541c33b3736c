//! `slots` CLI — generate bookable appointment slots and plan reminders from
//! the command line.
//!
//! ## Usage
//!
//! ```sh
//! # 30-minute slots for a date on the default clinic schedule
//! slots generate --date 2026-01-13 --duration 30
//!
//! # Pin "now" and mark existing bookings as unavailable
//! slots generate --date 2026-01-13 --duration 60 \
//!   --now 2026-01-13T12:00:00Z --booked booked.json
//!
//! # Use an alternate schedule table
//! slots generate --date 2026-01-10 --duration 30 --schedule weekend.json
//!
//! # Next (or previous) day the clinic is open
//! slots next-open --date 2026-01-16
//! slots next-open --date 2026-01-19 --backward
//!
//! # A week of slots, one entry per day
//! slots week --date 2026-01-12 --duration 60
//!
//! # Reminders and digests due now for an appointment snapshot
//! slots reminders --snapshot appointments.json --now 2026-01-13T14:00:00Z
//! ```
//!
//! Set `RUST_LOG=slot_engine=debug` to trace generation decisions on stderr.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Serialize;
use slot_engine::reminder::AppointmentRecord;
use slot_engine::{BookedInterval, TimeSlot, WeeklySchedule};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Clinic appointment slot generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookable slots for one date
    Generate {
        /// Civil date in the schedule's zone (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Appointment length in minutes (30 or 60)
        #[arg(short = 'm', long)]
        duration: u32,
        #[command(flatten)]
        common: CommonArgs,
        /// JSON file of booked intervals ([{"start": ..., "end": ...}])
        #[arg(long)]
        booked: Option<String>,
    },
    /// Find the nearest day with opening hours
    NextOpen {
        /// Date to search from, exclusive (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Search backward instead of forward
        #[arg(long)]
        backward: bool,
        /// Maximum number of days to look
        #[arg(long, default_value_t = 14)]
        horizon: u32,
        /// Schedule table JSON file (defaults to the clinic schedule)
        #[arg(long)]
        schedule: Option<String>,
    },
    /// List slots for consecutive days
    Week {
        /// First date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Appointment length in minutes (30 or 60)
        #[arg(short = 'm', long)]
        duration: u32,
        /// Number of days
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Plan patient reminders and doctor digests due at `now`
    Reminders {
        /// JSON file holding the appointment snapshot
        #[arg(short, long)]
        snapshot: String,
        /// JSON file of notification ids already delivered
        #[arg(long)]
        sent: Option<String>,
        /// Current instant (RFC 3339); defaults to the system clock
        #[arg(long)]
        now: Option<String>,
        /// IANA zone for day boundaries and message times
        #[arg(long, default_value = slot_engine::CLINIC_TIMEZONE)]
        zone: String,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Current instant (RFC 3339); defaults to the system clock
    #[arg(long)]
    now: Option<String>,
    /// Schedule table JSON file (defaults to the clinic schedule)
    #[arg(long)]
    schedule: Option<String>,
    /// IANA zone the schedule hours are expressed in
    #[arg(long, default_value = slot_engine::CLINIC_TIMEZONE)]
    zone: String,
}

/// A slot with its zone-local readings alongside the UTC instants.
#[derive(Serialize)]
struct SlotView {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    local_start: String,
    local_end: String,
    available: bool,
}

impl SlotView {
    fn new(slot: &TimeSlot, zone: Tz) -> Self {
        Self {
            start: slot.start,
            end: slot.end,
            local_start: slot.local_start(zone).to_rfc3339(),
            local_end: slot.local_end(zone).to_rfc3339(),
            available: slot.available,
        }
    }
}

#[derive(Serialize)]
struct DayView {
    date: NaiveDate,
    weekday: String,
    slots: Vec<SlotView>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            date,
            duration,
            common,
            booked,
        } => {
            let (date, duration, zone) = slot_engine::parse_request(&date, duration, &common.zone)?;
            let schedule = load_schedule(common.schedule.as_deref())?;
            let now = resolve_now(common.now.as_deref())?;

            let mut slots = slot_engine::generate(date, duration, now, &schedule, zone);
            if let Some(path) = booked {
                let booked: Vec<BookedInterval> = read_json(&path)?;
                debug!(bookings = booked.len(), "overlaying bookings");
                slots = slot_engine::mark_booked(&slots, &booked);
            }

            let views: Vec<SlotView> = slots.iter().map(|s| SlotView::new(s, zone)).collect();
            print_json(&views)?;
        }
        Commands::NextOpen {
            date,
            backward,
            horizon,
            schedule,
        } => {
            let from = slot_engine::zoned::parse_civil_date(&date)?;
            let schedule = load_schedule(schedule.as_deref())?;
            if schedule.is_closed_all_week() {
                anyhow::bail!("Schedule has no opening hours on any day");
            }
            let found = if backward {
                slot_engine::previous_open_date(from, &schedule, horizon)
            } else {
                slot_engine::next_open_date(from, &schedule, horizon)
            };
            match found {
                Some(d) => println!("{}", d),
                None => anyhow::bail!("No open day within {} days of {}", horizon, from),
            }
        }
        Commands::Week {
            date,
            duration,
            days,
            common,
        } => {
            let (start, duration, zone) = slot_engine::parse_request(&date, duration, &common.zone)?;
            let schedule = load_schedule(common.schedule.as_deref())?;
            let now = resolve_now(common.now.as_deref())?;

            let views: Vec<DayView> =
                slot_engine::generate_range(start, days, duration, now, &schedule, zone)
                    .into_iter()
                    .map(|day| DayView {
                        weekday: day.date.format("%A").to_string(),
                        date: day.date,
                        slots: day.slots.iter().map(|s| SlotView::new(s, zone)).collect(),
                    })
                    .collect();
            print_json(&views)?;
        }
        Commands::Reminders {
            snapshot,
            sent,
            now,
            zone,
        } => {
            let zone = slot_engine::zoned::parse_zone(&zone)?;
            let now = resolve_now(now.as_deref())?;
            let snapshot: Vec<AppointmentRecord> = read_json(&snapshot)?;
            let sent: HashSet<String> = match sent {
                Some(path) => read_json(&path)?,
                None => HashSet::new(),
            };

            let events = slot_engine::plan_notifications(&snapshot, now, zone, &sent);
            info!(due = events.len(), "reminder scan complete");
            print_json(&events)?;
        }
    }

    Ok(())
}

/// Load a schedule table, or the clinic default when no path is given.
fn load_schedule(path: Option<&str>) -> Result<WeeklySchedule> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read schedule file: {}", path))?;
            WeeklySchedule::from_json(&json)
                .with_context(|| format!("Failed to parse schedule file: {}", path))
        }
        None => Ok(WeeklySchedule::clinic_default()),
    }
}

/// Parse `--now`, falling back to the system clock. The clock is read once.
fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid --now instant: {}", text)),
        None => Ok(Utc::now()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in: {}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    println!("{}", pretty);
    Ok(())
}
