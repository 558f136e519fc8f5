//! Scenario tests for the report builders.

use chrono::{Duration, NaiveDate, Weekday};

use super::*;
use crate::export::{basic_table, to_csv};
use crate::geocode::AddressCache;
use crate::models::{Coordinates, DayStatus, EventType, LeaveStatus, StaffType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn user(id: &str, name: &str, role: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
    }
}

fn event(user_id: &str, event_type: EventType, day: NaiveDate, h: u32, m: u32) -> AttendanceEvent {
    AttendanceEvent {
        user_id: user_id.to_string(),
        timestamp: day.and_hms_opt(h, m, 0).unwrap().and_utc(),
        event_type,
        latitude: None,
        longitude: None,
        location_name: None,
    }
}

fn approved_leave(user_id: &str, start: NaiveDate, end: NaiveDate) -> LeaveRequest {
    LeaveRequest {
        user_id: user_id.to_string(),
        start_date: start,
        end_date: end,
        status: LeaveStatus::Approved,
    }
}

fn office_second_saturday() -> ReportOptions {
    ReportOptions {
        holidays: vec![HolidayRule {
            day: Weekday::Sat,
            n: 2,
            staff_type: StaffType::Office,
        }],
        ..Default::default()
    }
}

fn march_2025() -> DateRange {
    DateRange::new(date(2025, 3, 1), date(2025, 3, 31)).unwrap()
}

#[test]
fn test_single_day_three_users_one_check_in() {
    let today = date(2025, 3, 10);
    let users = vec![user("a", "Ana", "staff"), user("b", "Binh", "staff"), user("c", "Chi", "staff")];
    let events = vec![event("a", EventType::CheckIn, today, 9, 0)];
    let input = ReportInput {
        events: &events,
        leaves: &[],
        users: &users,
        range: DateRange::single(today),
        selected_user: None,
    };
    let options = ReportOptions::default();

    let stats = today_stats(&input, &options, today);
    assert_eq!(stats.present, 1);
    assert_eq!(stats.absent, 2);

    let trend = build_trend(&input, &options);
    assert_eq!(trend.present, vec![1]);
    assert_eq!(trend.absent, vec![2]);
    assert_eq!(trend.on_leave, vec![0]);
    assert_eq!(trend.avg_hours, vec![0.0]);
}

#[test]
fn test_absent_clamped_when_leave_overlaps_presence() {
    let today = date(2025, 3, 10);
    let users: Vec<User> = (1..=5).map(|i| user(&i.to_string(), "U", "staff")).collect();
    let events: Vec<AttendanceEvent> = (1..=4)
        .map(|i| event(&i.to_string(), EventType::CheckIn, today, 8, 0))
        .collect();
    let leaves: Vec<LeaveRequest> = (2..=4).map(|i| approved_leave(&i.to_string(), today, today)).collect();
    let input = ReportInput {
        events: &events,
        leaves: &leaves,
        users: &users,
        range: DateRange::single(today),
        selected_user: None,
    };

    let stats = today_stats(&input, &ReportOptions::default(), today);
    assert_eq!(stats.present, 4);
    assert_eq!(stats.on_leave, 3);
    assert_eq!(stats.absent, 0);
}

#[test]
fn test_trend_avg_hours_over_present_users() {
    let day = date(2025, 3, 11);
    let users = vec![user("a", "Ana", "staff"), user("b", "Binh", "staff"), user("c", "Chi", "staff")];
    let events = vec![
        event("a", EventType::CheckIn, day, 9, 0),
        event("a", EventType::CheckOut, day, 17, 0),
        event("b", EventType::CheckIn, day, 9, 0),
        event("b", EventType::CheckOut, day, 18, 0),
        // Present without a check-out still counts in the denominator
        event("c", EventType::CheckIn, day, 9, 0),
    ];
    let leaves = vec![approved_leave("c", date(2025, 3, 12), date(2025, 3, 12))];
    let input = ReportInput {
        events: &events,
        leaves: &leaves,
        users: &users,
        range: DateRange::new(day, date(2025, 3, 12)).unwrap(),
        selected_user: None,
    };

    let days = build_daily_stats(&input, &ReportOptions::default());
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].present, 3);
    assert_eq!(days[0].avg_hours, 5.7);
    assert_eq!(days[1].present, 0);
    assert_eq!(days[1].on_leave, 1);
    assert_eq!(days[1].absent, 2);
    assert_eq!(days[1].avg_hours, 0.0);
}

#[test]
fn test_avg_hours_uses_exact_session_length() {
    // 4h02m30s + 4h03m30s = 8h06m over two users is 4.05h
    let day = date(2025, 3, 11);
    let users = vec![user("a", "Ana", "staff"), user("b", "Binh", "staff")];
    let mut a_out = event("a", EventType::CheckOut, day, 13, 2);
    a_out.timestamp += Duration::seconds(30);
    let mut b_out = event("b", EventType::CheckOut, day, 13, 3);
    b_out.timestamp += Duration::seconds(30);
    let events = vec![
        event("a", EventType::CheckIn, day, 9, 0),
        a_out,
        event("b", EventType::CheckIn, day, 9, 0),
        b_out,
    ];
    let input = ReportInput {
        events: &events,
        leaves: &[],
        users: &users,
        range: DateRange::single(day),
        selected_user: None,
    };

    let days = build_daily_stats(&input, &ReportOptions::default());
    assert_eq!(days[0].present, 2);
    assert_eq!(days[0].avg_hours, 4.1);

    // Display durations are still floored to minutes
    let rows = build_basic_report(&input, &ReportOptions::default());
    assert_eq!(rows[0].duration.as_deref(), Some("4h 2m"));
}

#[test]
fn test_trend_counts_sunday_as_absent() {
    let sunday = date(2025, 3, 9);
    let users = vec![user("a", "Ana", "staff")];
    let input = ReportInput {
        events: &[],
        leaves: &[],
        users: &users,
        range: DateRange::single(sunday),
        selected_user: None,
    };

    let trend = build_trend(&input, &ReportOptions::default());
    assert_eq!(trend.absent, vec![1]);

    let monthly = build_monthly_report(&input, &ReportOptions::default());
    assert_eq!(monthly[0].week_offs, 1);
    assert_eq!(monthly[0].absent_days, 0);
}

#[test]
fn test_monthly_counters_cover_every_day() {
    let range = march_2025();
    let users = vec![user("a", "Ana", "staff"), user("f", "Phuc", "field_staff")];
    let mut events = Vec::new();
    for day in range.days().step_by(2) {
        events.push(event("a", EventType::CheckIn, day, 8, 0));
        events.push(event("a", EventType::CheckOut, day, 12, 0));
    }
    events.push(event("f", EventType::CheckIn, date(2025, 3, 8), 8, 0));
    let input = ReportInput {
        events: &events,
        leaves: &[],
        users: &users,
        range,
        selected_user: None,
    };
    let options = ReportOptions {
        half_day_threshold_minutes: Some(300),
        ..office_second_saturday()
    };

    let rows = build_monthly_report(&input, &options);
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.counted_days() as usize, range.len());
        assert_eq!(row.days.len(), range.len());
    }
}

#[test]
fn test_monthly_codes_and_payable_days() {
    let range = DateRange::new(date(2025, 3, 7), date(2025, 3, 10)).unwrap();
    let users = vec![user("a", "Ana", "staff")];
    let events = vec![
        // Fri: full day
        event("a", EventType::CheckIn, date(2025, 3, 7), 9, 0),
        event("a", EventType::CheckOut, date(2025, 3, 7), 17, 0),
        // Sat, second of the month: office holiday, not worked
        // Sun: worked
        event("a", EventType::CheckIn, date(2025, 3, 9), 10, 0),
        // Mon: short session
        event("a", EventType::CheckIn, date(2025, 3, 10), 9, 0),
        event("a", EventType::CheckOut, date(2025, 3, 10), 11, 0),
    ];
    let input = ReportInput {
        events: &events,
        leaves: &[],
        users: &users,
        range,
        selected_user: None,
    };
    let options = ReportOptions {
        half_day_threshold_minutes: Some(240),
        ..office_second_saturday()
    };

    let row = &build_monthly_report(&input, &options)[0];
    assert_eq!(row.codes(), vec!["P", "H", "WOP", "1/2P"]);
    assert_eq!(row.present_days, 1);
    assert_eq!(row.holidays, 1);
    assert_eq!(row.weekend_presents, 1);
    assert_eq!(row.half_days, 1);
    assert_eq!(row.total_payable_days, 3.5);
}

#[test]
fn test_without_threshold_no_half_days() {
    let day = date(2025, 3, 10);
    let users = vec![user("a", "Ana", "staff")];
    let events = vec![
        event("a", EventType::CheckIn, day, 9, 0),
        event("a", EventType::CheckOut, day, 9, 30),
    ];
    let input = ReportInput {
        events: &events,
        leaves: &[],
        users: &users,
        range: DateRange::single(day),
        selected_user: None,
    };

    let row = &build_monthly_report(&input, &ReportOptions::default())[0];
    assert_eq!(row.half_days, 0);
    assert_eq!(row.days, vec![DayStatus::Present]);
}

#[test]
fn test_basic_report_rows_and_selection() {
    let range = DateRange::new(date(2025, 3, 8), date(2025, 3, 10)).unwrap();
    let users = vec![user("a", "Ana", "staff"), user("b", "Binh", "field_staff")];
    let events = vec![
        event("a", EventType::CheckIn, date(2025, 3, 10), 9, 0),
        event("a", EventType::CheckOut, date(2025, 3, 10), 17, 30),
        event("b", EventType::CheckIn, date(2025, 3, 8), 7, 45),
    ];
    let mut input = ReportInput {
        events: &events,
        leaves: &[],
        users: &users,
        range,
        selected_user: None,
    };
    let options = office_second_saturday();

    let rows = build_basic_report(&input, &options);
    assert_eq!(rows.len(), 6);
    let statuses: Vec<(&str, DayStatus)> = rows.iter().map(|r| (r.user_id.as_str(), r.status)).collect();
    assert_eq!(
        statuses,
        vec![
            ("a", DayStatus::Holiday),
            ("b", DayStatus::Present),
            ("a", DayStatus::WeekOff),
            ("b", DayStatus::WeekOff),
            ("a", DayStatus::Present),
            ("b", DayStatus::Absent),
        ]
    );
    assert_eq!(rows[4].duration.as_deref(), Some("8h 30m"));
    assert_eq!(rows[1].duration, None);

    input.selected_user = Some("b");
    let rows = build_basic_report(&input, &options);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.user_name == "Binh"));
}

#[test]
fn test_basic_report_csv_round_trip() {
    let range = DateRange::new(date(2025, 3, 10), date(2025, 3, 11)).unwrap();
    let users = vec![
        user("a", "Nguyen, Van \"Tom\"", "staff"),
        user("b", "Plain", "staff"),
    ];
    let events = vec![
        event("a", EventType::CheckIn, date(2025, 3, 10), 9, 0),
        event("a", EventType::CheckOut, date(2025, 3, 10), 17, 30),
    ];
    let input = ReportInput {
        events: &events,
        leaves: &[],
        users: &users,
        range,
        selected_user: None,
    };

    let rows = build_basic_report(&input, &ReportOptions::default());
    let csv_text = to_csv(&basic_table(&rows)).unwrap();

    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let header = reader.headers().unwrap().clone();
    assert_eq!(
        header.iter().collect::<Vec<_>>(),
        vec!["Employee", "Date", "Status", "Check In", "Check Out", "Duration"]
    );

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), users.len() * range.len());
    assert_eq!(
        records[0].iter().collect::<Vec<_>>(),
        vec!["Nguyen, Van \"Tom\"", "2025-03-10", "Present", "09:00", "17:30", "8h 30m"]
    );
    assert_eq!(
        records[3].iter().collect::<Vec<_>>(),
        vec!["Plain", "2025-03-11", "Absent", "-", "-", "-"]
    );
    assert!(csv_text.contains("\"Nguyen, Van \"\"Tom\"\"\""));
}

#[test]
fn test_log_report_sorted_and_filtered() {
    let range = DateRange::new(date(2025, 3, 10), date(2025, 3, 11)).unwrap();
    let users = vec![user("a", "Ana", "staff"), user("b", "Binh", "staff")];
    let mut located = event("b", EventType::CheckIn, date(2025, 3, 10), 8, 0);
    located.latitude = Some(10.1234567);
    located.longitude = Some(106.7654321);
    let mut named = event("a", EventType::CheckOut, date(2025, 3, 10), 17, 0);
    named.location_name = Some("Head office".to_string());
    named.latitude = Some(1.0);
    named.longitude = Some(2.0);
    let events = vec![
        event("a", EventType::CheckIn, date(2025, 3, 11), 9, 0),
        named,
        located,
        // Outside the range
        event("a", EventType::CheckIn, date(2025, 3, 12), 9, 0),
        // Unknown user
        event("zz", EventType::CheckIn, date(2025, 3, 10), 6, 0),
    ];
    let input = ReportInput {
        events: &events,
        leaves: &[],
        users: &users,
        range,
        selected_user: None,
    };
    let mut addresses = AddressCache::new();
    addresses.insert(
        &Coordinates {
            lat: 10.1234567,
            lon: 106.7654321,
        },
        "District 1",
    );

    let rows = build_log_report(&input, &ReportOptions::default(), &addresses);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].user_name, "Binh");
    assert_eq!(rows[0].address, "District 1");
    assert_eq!(rows[1].address, "Head office");
    assert_eq!(rows[2].date, date(2025, 3, 11));
    assert_eq!(rows[2].address, "-");
}

#[test]
fn test_events_follow_configured_offset() {
    // 20:00 UTC on the 10th is 01:30 on the 11th at +05:30
    let users = vec![user("a", "Ana", "staff")];
    let events = vec![event("a", EventType::CheckIn, date(2025, 3, 10), 20, 0)];
    let input = ReportInput {
        events: &events,
        leaves: &[],
        users: &users,
        range: DateRange::new(date(2025, 3, 10), date(2025, 3, 11)).unwrap(),
        selected_user: None,
    };
    let report = crate::config::ReportConfig {
        utc_offset_minutes: 330,
        ..Default::default()
    };
    let options = ReportOptions::from_config(&report, &[]);

    let rows = build_basic_report(&input, &options);
    assert_eq!(rows[0].status, DayStatus::Absent);
    assert_eq!(rows[1].status, DayStatus::Present);
    assert_eq!(rows[1].check_in.map(|t| t.format("%H:%M").to_string()).as_deref(), Some("01:30"));
}

#[test]
fn test_out_of_range_offset_falls_back_to_utc() {
    let report = crate::config::ReportConfig {
        utc_offset_minutes: i32::MIN,
        ..Default::default()
    };
    let options = ReportOptions::from_config(&report, &[]);
    assert_eq!(options.utc_offset.local_minus_utc(), 0);
}
