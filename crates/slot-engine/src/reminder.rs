//! Reminder and digest planning over an appointment snapshot.
//!
//! The planner reads an immutable list of appointments and a `now` instant and
//! returns the notifications that are due. Delivery, persistence of the sent
//! set, and the polling interval belong to the caller; calling the planner
//! again with the returned ids added to `sent` yields nothing new.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::zoned::civil_date_in_zone;

/// How far ahead a patient reminder fires.
pub const REMINDER_LEAD_HOURS: i64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
    Completed,
    Pending,
}

/// A persisted appointment, as read from the booking store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reminder,
    Digest,
}

/// A notification the caller should deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Stable id; the same appointment or doctor-day always maps to the same id.
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub appointment_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Plan the patient reminders and doctor digests due at `now`.
///
/// - A patient gets one reminder per confirmed appointment starting within
///   the next [`REMINDER_LEAD_HOURS`] hours (exclusive of `now`).
/// - A doctor gets one digest per zone-local day listing their confirmed
///   appointments on the same day as `now`. Days with none get no digest.
///
/// Ids already present in `sent` are not emitted again. Output is sorted by id.
pub fn plan_notifications(
    snapshot: &[AppointmentRecord],
    now: DateTime<Utc>,
    zone: Tz,
    sent: &HashSet<String>,
) -> Vec<NotificationEvent> {
    let mut events: Vec<NotificationEvent> = Vec::new();
    let lead = Duration::hours(REMINDER_LEAD_HOURS);
    let today = civil_date_in_zone(now, zone);

    for appt in snapshot
        .iter()
        .filter(|a| a.status == AppointmentStatus::Confirmed)
    {
        if appt.start <= now || appt.start - now > lead {
            continue;
        }
        let id = format!("reminder_{}", appt.id);
        if sent.contains(&id) {
            continue;
        }
        let local = appt.start.with_timezone(&zone);
        events.push(NotificationEvent {
            id,
            user_id: appt.patient_id.clone(),
            kind: NotificationKind::Reminder,
            title: "Upcoming Appointment Reminder".to_string(),
            message: format!(
                "You have an appointment on {} at {}.",
                local.format("%a, %b %-d"),
                local.format("%-I:%M %p")
            ),
            appointment_ids: vec![appt.id.clone()],
            created_at: now,
        });
    }

    let mut per_doctor: BTreeMap<&str, Vec<&AppointmentRecord>> = BTreeMap::new();
    for appt in snapshot.iter().filter(|a| {
        a.status == AppointmentStatus::Confirmed && civil_date_in_zone(a.start, zone) == today
    }) {
        per_doctor.entry(appt.doctor_id.as_str()).or_default().push(appt);
    }

    for (doctor_id, mut appts) in per_doctor {
        let id = format!("digest_{}_{}", doctor_id, today.format("%Y-%m-%d"));
        if sent.contains(&id) {
            continue;
        }
        appts.sort_by_key(|a| a.start);
        events.push(NotificationEvent {
            id,
            user_id: doctor_id.to_string(),
            kind: NotificationKind::Digest,
            title: "Daily Appointment Digest".to_string(),
            message: format!(
                "You have {} confirmed appointment(s) scheduled for today.",
                appts.len()
            ),
            appointment_ids: appts.iter().map(|a| a.id.clone()).collect(),
            created_at: now,
        });
    }

    events.sort_by(|a, b| a.id.cmp(&b.id));
    debug!(due = events.len(), %now, "notifications planned");
    events
}
