//! Tests for slot generation against the clinic's weekly schedule.
//!
//! Dates used below (all 2026, America/New_York):
//! - Jan 13 Tue, Jan 16 Fri, Jan 10 Sat, Jan 11 Sun (EST, UTC-5)
//! - Jul 14 Tue (EDT, UTC-4)
//! - Mar 8 Sun: spring forward at 02:00; Nov 1 Sun: fall back at 02:00

use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use slot_engine::{
    generate, generate_for_instant, generate_from_input, parse_request, SlotDuration, SlotError,
    TimeSlot, WeeklySchedule, Window,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn ny() -> Tz {
    chrono_tz::America::New_York
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// A `now` far enough in the past that nothing is filtered.
fn long_ago() -> DateTime<Utc> {
    utc(2020, 1, 1, 0, 0)
}

fn local_hm(slot: &TimeSlot) -> String {
    slot.local_start(ny()).format("%H:%M").to_string()
}

fn clinic() -> WeeklySchedule {
    WeeklySchedule::clinic_default()
}

// ── Weekday windows ─────────────────────────────────────────────────────────

#[test]
fn tuesday_thirty_minutes_yields_twenty_four_slots() {
    // now is 01:00 EST, before the 02:00 opening.
    let now = utc(2026, 1, 13, 6, 0);
    let slots = generate(date(2026, 1, 13), SlotDuration::Thirty, now, &clinic(), ny());

    assert_eq!(slots.len(), 24);
    assert_eq!(local_hm(&slots[0]), "02:00");
    assert_eq!(slots[0].start, utc(2026, 1, 13, 7, 0));
    assert_eq!(local_hm(&slots[23]), "13:30");
    assert_eq!(slots[23].end, utc(2026, 1, 13, 19, 0));
    assert!(slots.iter().all(|s| s.available));
}

#[test]
fn friday_sixty_minutes_skips_midday_closure() {
    let slots = generate(date(2026, 1, 16), SlotDuration::Sixty, long_ago(), &clinic(), ny());

    let starts: Vec<String> = slots.iter().map(local_hm).collect();
    assert_eq!(
        starts,
        vec!["02:00", "03:00", "04:00", "05:00", "06:00", "11:00", "12:00", "13:00"]
    );
    // Nothing inside 07:00-11:00.
    let closed_from = utc(2026, 1, 16, 12, 0);
    let closed_to = utc(2026, 1, 16, 16, 0);
    assert!(slots.iter().all(|s| !s.overlaps(closed_from, closed_to)));
}

#[test]
fn monday_window_closes_at_eleven() {
    let slots = generate(date(2026, 1, 12), SlotDuration::Sixty, long_ago(), &clinic(), ny());
    assert_eq!(slots.len(), 9);
    assert_eq!(local_hm(slots.last().unwrap()), "10:00");
}

#[test]
fn weekend_is_closed() {
    for d in [date(2026, 1, 10), date(2026, 1, 11)] {
        for duration in SlotDuration::ALL {
            assert!(generate(d, duration, long_ago(), &clinic(), ny()).is_empty());
        }
    }
}

// ── Past exclusion ──────────────────────────────────────────────────────────

#[test]
fn slots_at_or_before_now_are_excluded() {
    // 07:15 EST: the next start is 07:30.
    let now = utc(2026, 1, 13, 12, 15);
    let slots = generate(date(2026, 1, 13), SlotDuration::Thirty, now, &clinic(), ny());
    assert_eq!(slots.len(), 13);
    assert_eq!(local_hm(&slots[0]), "07:30");

    // now exactly at a slot start rejects that slot too.
    let now = utc(2026, 1, 13, 12, 30);
    let slots = generate(date(2026, 1, 13), SlotDuration::Thirty, now, &clinic(), ny());
    assert_eq!(slots.len(), 12);
    assert_eq!(local_hm(&slots[0]), "08:00");
}

#[test]
fn slot_in_progress_is_excluded() {
    // 02:10 EST: the 02:00 slot has started.
    let now = utc(2026, 1, 13, 7, 10);
    let slots = generate(date(2026, 1, 13), SlotDuration::Sixty, now, &clinic(), ny());
    assert_eq!(local_hm(&slots[0]), "03:00");
}

#[test]
fn day_entirely_in_the_past_is_empty() {
    let now = utc(2026, 1, 14, 0, 0);
    assert!(generate(date(2026, 1, 13), SlotDuration::Thirty, now, &clinic(), ny()).is_empty());
}

// ── Window clipping ─────────────────────────────────────────────────────────

#[test]
fn trailing_partial_slot_is_dropped_not_shortened() {
    let schedule = WeeklySchedule::closed()
        .with_day(Weekday::Tue, vec![Window::from_hours(2.0, 4.5).unwrap()])
        .unwrap();

    let hours = generate(date(2026, 1, 13), SlotDuration::Sixty, long_ago(), &schedule, ny());
    let starts: Vec<String> = hours.iter().map(local_hm).collect();
    assert_eq!(starts, vec!["02:00", "03:00"]);
    assert!(hours.iter().all(|s| s.duration_minutes() == 60));

    let halves = generate(date(2026, 1, 13), SlotDuration::Thirty, long_ago(), &schedule, ny());
    assert_eq!(halves.len(), 5);
    assert_eq!(local_hm(halves.last().unwrap()), "04:00");
}

#[test]
fn slot_ending_exactly_at_window_end_is_kept() {
    // Friday afternoon window is 11:00-14:00; 13:00-14:00 ends on the boundary.
    let slots = generate(date(2026, 1, 16), SlotDuration::Sixty, long_ago(), &clinic(), ny());
    let last = slots.last().unwrap();
    assert_eq!(local_hm(last), "13:00");
    assert_eq!(last.end, utc(2026, 1, 16, 19, 0));

    let afternoon: Vec<&TimeSlot> = slots
        .iter()
        .filter(|s| s.start >= utc(2026, 1, 16, 16, 0))
        .collect();
    assert_eq!(afternoon.len(), 3);
}

#[test]
fn window_ending_at_midnight_keeps_last_slot() {
    let schedule = WeeklySchedule::closed()
        .with_day(Weekday::Tue, vec![Window::from_hours(23.0, 24.0).unwrap()])
        .unwrap();
    let slots = generate(date(2026, 1, 13), SlotDuration::Thirty, long_ago(), &schedule, ny());
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[1].end, utc(2026, 1, 14, 5, 0));
}

#[test]
fn touching_windows_do_not_merge_across_boundary() {
    // [02:00, 02:30) and [02:30, 04:00): a 60-minute slot may not start at
    // 02:00 because it would span both windows.
    let schedule = WeeklySchedule::closed()
        .with_day(
            Weekday::Tue,
            vec![
                Window::from_hours(2.0, 2.5).unwrap(),
                Window::from_hours(2.5, 4.0).unwrap(),
            ],
        )
        .unwrap();
    let slots = generate(date(2026, 1, 13), SlotDuration::Sixty, long_ago(), &schedule, ny());
    let starts: Vec<String> = slots.iter().map(local_hm).collect();
    assert_eq!(starts, vec!["02:30"]);
}

#[test]
fn substituted_schedule_opens_saturday() {
    let schedule = WeeklySchedule::closed()
        .with_day(Weekday::Sat, vec![Window::from_hours(9.0, 10.0).unwrap()])
        .unwrap();
    let slots = generate(date(2026, 1, 10), SlotDuration::Thirty, long_ago(), &schedule, ny());
    assert_eq!(slots.len(), 2);
    assert!(generate(date(2026, 1, 13), SlotDuration::Thirty, long_ago(), &schedule, ny())
        .is_empty());
}

// ── Time zones and DST ──────────────────────────────────────────────────────

#[test]
fn opening_hour_tracks_offset_of_the_target_date() {
    let winter = generate(date(2026, 1, 13), SlotDuration::Sixty, long_ago(), &clinic(), ny());
    let summer = generate(date(2026, 7, 14), SlotDuration::Sixty, long_ago(), &clinic(), ny());
    assert_eq!(winter[0].start, utc(2026, 1, 13, 7, 0)); // UTC-5
    assert_eq!(summer[0].start, utc(2026, 7, 14, 6, 0)); // UTC-4
    assert_eq!(local_hm(&winter[0]), "02:00");
    assert_eq!(local_hm(&summer[0]), "02:00");
}

#[test]
fn offset_does_not_depend_on_now() {
    // A winter `now` must not leak EST into a summer date, and vice versa.
    let winter_now = utc(2026, 1, 5, 12, 0);
    let summer_now = utc(2026, 6, 1, 12, 0);
    let a = generate(date(2026, 7, 14), SlotDuration::Thirty, winter_now, &clinic(), ny());
    let b = generate(date(2026, 7, 14), SlotDuration::Thirty, summer_now, &clinic(), ny());
    assert_eq!(a, b);
    assert_eq!(a[0].start, utc(2026, 7, 14, 6, 0));
}

#[test]
fn dates_either_side_of_spring_forward() {
    // Fri Mar 6 is EST, Mon Mar 9 is EDT.
    let before = generate(date(2026, 3, 6), SlotDuration::Sixty, long_ago(), &clinic(), ny());
    let after = generate(date(2026, 3, 9), SlotDuration::Sixty, long_ago(), &clinic(), ny());
    assert_eq!(before[0].start, utc(2026, 3, 6, 7, 0));
    assert_eq!(after[0].start, utc(2026, 3, 9, 6, 0));
    assert_eq!(local_hm(&before[0]), "02:00");
    assert_eq!(local_hm(&after[0]), "02:00");
}

#[test]
fn dates_either_side_of_fall_back() {
    // Fri Oct 30 is EDT, Mon Nov 2 is EST.
    let before = generate(date(2026, 10, 30), SlotDuration::Sixty, long_ago(), &clinic(), ny());
    let after = generate(date(2026, 11, 2), SlotDuration::Sixty, long_ago(), &clinic(), ny());
    assert_eq!(before[0].start, utc(2026, 10, 30, 6, 0));
    assert_eq!(after[0].start, utc(2026, 11, 2, 7, 0));
}

#[test]
fn spring_forward_day_skips_the_missing_hour() {
    let schedule = WeeklySchedule::closed()
        .with_day(Weekday::Sun, vec![Window::from_hours(0.0, 6.0).unwrap()])
        .unwrap();
    let slots = generate(date(2026, 3, 8), SlotDuration::Sixty, long_ago(), &schedule, ny());

    // 00:00, 01:00 EST then 03:00, 04:00, 05:00 EDT; 02:00 does not exist.
    let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start).collect();
    assert_eq!(
        starts,
        vec![
            utc(2026, 3, 8, 5, 0),
            utc(2026, 3, 8, 6, 0),
            utc(2026, 3, 8, 7, 0),
            utc(2026, 3, 8, 8, 0),
            utc(2026, 3, 8, 9, 0),
        ]
    );
    assert!(slots.iter().all(|s| s.duration_minutes() == 60));
    assert!(slots.iter().all(|s| local_hm(s) != "02:00"));
}

#[test]
fn fall_back_day_keeps_slots_disjoint() {
    let schedule = WeeklySchedule::closed()
        .with_day(Weekday::Sun, vec![Window::from_hours(0.0, 4.0).unwrap()])
        .unwrap();
    let slots = generate(date(2026, 11, 1), SlotDuration::Sixty, long_ago(), &schedule, ny());

    // 00:00 EDT, 01:00 EDT (first occurrence), 02:00 EST, 03:00 EST.
    let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start).collect();
    assert_eq!(
        starts,
        vec![
            utc(2026, 11, 1, 4, 0),
            utc(2026, 11, 1, 5, 0),
            utc(2026, 11, 1, 7, 0),
            utc(2026, 11, 1, 8, 0),
        ]
    );
    for pair in slots.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }
}

#[test]
fn utc_midnight_instant_resolves_to_new_york_day() {
    // 2026-01-14T00:00Z is Tuesday evening in New York.
    let picked = utc(2026, 1, 14, 0, 0);
    let slots = generate_for_instant(picked, SlotDuration::Thirty, long_ago(), &clinic(), ny());
    assert_eq!(slots.len(), 24);
    assert_eq!(slots[0].start, utc(2026, 1, 13, 7, 0));

    // Saturday 03:00Z is still Friday 22:00 in New York.
    let picked = utc(2026, 1, 17, 3, 0);
    let slots = generate_for_instant(picked, SlotDuration::Sixty, long_ago(), &clinic(), ny());
    assert_eq!(slots.len(), 8);
}

#[test]
fn last_representable_date_does_not_overflow() {
    let all_day = vec![Window::new(0, 24 * 60).unwrap()];
    let schedule = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .fold(WeeklySchedule::closed(), |s, wd| {
        s.with_day(wd, all_day.clone()).unwrap()
    });

    // The 23:00 slot would end past the last representable instant.
    let slots = generate(
        NaiveDate::MAX,
        SlotDuration::Sixty,
        long_ago(),
        &schedule,
        chrono_tz::UTC,
    );
    assert_eq!(slots.len(), 23);
    assert!(slots.iter().all(|s| s.duration_minutes() == 60));

    // Same date in New York: nothing may panic, whatever survives is whole.
    let slots = generate(NaiveDate::MAX, SlotDuration::Thirty, long_ago(), &schedule, ny());
    assert!(slots.iter().all(|s| s.duration_minutes() == 30));
}

// ── Purity and input validation ─────────────────────────────────────────────

#[test]
fn identical_inputs_give_identical_output() {
    let schedule = clinic();
    let now = utc(2026, 1, 13, 9, 45);
    let a = generate(date(2026, 1, 13), SlotDuration::Thirty, now, &schedule, ny());
    let b = generate(date(2026, 1, 13), SlotDuration::Thirty, now, &schedule, ny());
    assert_eq!(a, b);
    assert_eq!(schedule, clinic());
}

#[test]
fn raw_input_is_validated() {
    let s = clinic();
    let now = long_ago();

    let ok = generate_from_input("2026-01-13", 30, now, &s, "America/New_York").unwrap();
    assert_eq!(ok.len(), 24);

    let err = generate_from_input("2026-13-01", 30, now, &s, "America/New_York").unwrap_err();
    assert!(matches!(err, SlotError::InvalidDate(_)));
    assert!(err.is_invalid_argument());

    let err = generate_from_input("2026-01-13", 45, now, &s, "America/New_York").unwrap_err();
    assert_eq!(err, SlotError::UnsupportedDuration(45));

    let err = generate_from_input("2026-01-13", 30, now, &s, "Nowhere/Town").unwrap_err();
    assert!(matches!(err, SlotError::InvalidTimezone(_)));
    assert!(err.is_invalid_argument());
}

#[test]
fn request_parts_parse_together() {
    let (d, duration, zone) = parse_request("2026-01-16", 60, "America/New_York").unwrap();
    assert_eq!(d, date(2026, 1, 16));
    assert_eq!(duration, SlotDuration::Sixty);
    assert_eq!(zone, ny());

    // The date is checked first.
    assert!(matches!(
        parse_request("soon", 45, "Nowhere/Town"),
        Err(SlotError::InvalidDate(_))
    ));
}

#[test]
fn slots_serialize_as_rfc3339() {
    let slots = generate(date(2026, 1, 13), SlotDuration::Sixty, long_ago(), &clinic(), ny());
    let json = serde_json::to_value(&slots[0]).unwrap();
    assert_eq!(json["start"], "2026-01-13T07:00:00Z");
    assert_eq!(json["end"], "2026-01-13T08:00:00Z");
    assert_eq!(json["available"], true);
}
