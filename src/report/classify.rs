//! Per-user, per-day attendance classification.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc, Weekday};

use super::ReportOptions;
use crate::models::{AttendanceEvent, DayStatus, EventType, StaffType, is_holiday};

/// Earliest check-in and check-out of one user on one day.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayEvents<'a> {
    pub check_in: Option<&'a AttendanceEvent>,
    pub check_out: Option<&'a AttendanceEvent>,
    /// Number of events of any type.
    pub count: usize,
}

impl<'a> DayEvents<'a> {
    /// Collect the earliest check-in and check-out from a user's events for one day.
    pub fn from_events(events: impl IntoIterator<Item = &'a AttendanceEvent>) -> Self {
        let mut day = Self::default();
        for event in events {
            day.push(event);
        }
        day
    }

    /// Record one more event, keeping the earliest of each type.
    pub fn push(&mut self, event: &'a AttendanceEvent) {
        self.count += 1;
        let slot = match event.event_type {
            EventType::CheckIn => &mut self.check_in,
            EventType::CheckOut => &mut self.check_out,
        };
        if slot.is_none_or(|current| event.timestamp < current.timestamp) {
            *slot = Some(event);
        }
    }

    /// Exact time between check-in and check-out.
    ///
    /// `None` without both events, or when the check-out precedes the check-in.
    pub fn elapsed(&self) -> Option<Duration> {
        let check_in = self.check_in?;
        let check_out = self.check_out?;
        let elapsed = check_out.timestamp - check_in.timestamp;
        (elapsed >= Duration::zero()).then_some(elapsed)
    }

    /// Completed session length floored to whole minutes.
    pub fn session_duration(&self) -> Option<Duration> {
        self.elapsed().map(|elapsed| Duration::minutes(elapsed.num_minutes()))
    }
}

/// Events grouped by user and local calendar day.
#[derive(Debug, Default)]
pub struct EventIndex<'a> {
    days: HashMap<&'a str, HashMap<NaiveDate, DayEvents<'a>>>,
}

impl<'a> EventIndex<'a> {
    /// Group events by user id and the calendar day they fall on in `offset`.
    pub fn build(events: &'a [AttendanceEvent], offset: FixedOffset) -> Self {
        let mut days: HashMap<&'a str, HashMap<NaiveDate, DayEvents<'a>>> = HashMap::new();
        for event in events {
            days.entry(event.user_id.as_str())
                .or_default()
                .entry(event.local_date(offset))
                .or_default()
                .push(event);
        }
        Self { days }
    }

    /// Events of `user_id` on `date`, if any.
    pub fn get(&self, user_id: &str, date: NaiveDate) -> Option<&DayEvents<'a>> {
        self.days.get(user_id).and_then(|by_day| by_day.get(&date))
    }
}

/// Classification result for one user on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
}

impl DayRecord {
    /// Local check-in time.
    pub fn check_in_time(&self, offset: FixedOffset) -> Option<NaiveTime> {
        self.check_in.map(|ts| ts.with_timezone(&offset).time())
    }

    /// Local check-out time.
    pub fn check_out_time(&self, offset: FixedOffset) -> Option<NaiveTime> {
        self.check_out.map(|ts| ts.with_timezone(&offset).time())
    }
}

/// Classify one day for one user.
///
/// Holiday rules are checked before the Sunday week-off, and any check-in
/// turns the day into a present variant.
pub fn classify_day(
    date: NaiveDate,
    events: Option<&DayEvents<'_>>,
    staff_type: StaffType,
    options: &ReportOptions,
) -> DayRecord {
    let holiday = is_holiday(&options.holidays, date, staff_type);
    let weekend = date.weekday() == Weekday::Sun;

    let check_in = events.and_then(|d| d.check_in);
    let check_out = events.and_then(|d| d.check_out);
    let duration = events.and_then(DayEvents::session_duration);

    let status = match (check_in.is_some(), holiday, weekend) {
        (true, true, _) => DayStatus::HolidayPresent,
        (true, false, true) => DayStatus::WeekendPresent,
        (true, false, false) if is_short_session(duration, options) => DayStatus::HalfDay,
        (true, false, false) => DayStatus::Present,
        (false, true, _) => DayStatus::Holiday,
        (false, false, true) => DayStatus::WeekOff,
        (false, false, false) => DayStatus::Absent,
    };

    DayRecord {
        date,
        status,
        check_in: check_in.map(|e| e.timestamp),
        check_out: check_out.map(|e| e.timestamp),
        duration,
    }
}

/// Classify one day from the raw events of one user on that day.
pub fn classify_events(
    date: NaiveDate,
    events: &[AttendanceEvent],
    staff_type: StaffType,
    options: &ReportOptions,
) -> DayRecord {
    let day = DayEvents::from_events(events);
    classify_day(date, Some(&day), staff_type, options)
}

fn is_short_session(duration: Option<Duration>, options: &ReportOptions) -> bool {
    match (duration, options.half_day_threshold_minutes) {
        (Some(duration), Some(threshold)) => duration.num_minutes() < i64::from(threshold),
        _ => false,
    }
}

/// Format a duration as `{hours}h {minutes}m`.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}
