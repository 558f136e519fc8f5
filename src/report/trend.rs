//! Daily trend series and today's stat tiles.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::classify::EventIndex;
use super::{ReportInput, ReportOptions};

/// Attendance counts for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub present: usize,
    pub absent: usize,
    pub on_leave: usize,
    pub avg_hours: f64,
}

/// Chart-ready trend series with one entry per day of the range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceTrend {
    pub labels: Vec<String>,
    pub present: Vec<usize>,
    pub absent: Vec<usize>,
    pub on_leave: Vec<usize>,
    pub avg_hours: Vec<f64>,
}

impl AttendanceTrend {
    /// Number of days in the series.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Split per-day counts into parallel series.
    pub fn from_days(days: &[DailyStats]) -> Self {
        Self {
            labels: days.iter().map(|d| d.date.format("%d %b").to_string()).collect(),
            present: days.iter().map(|d| d.present).collect(),
            absent: days.iter().map(|d| d.absent).collect(),
            on_leave: days.iter().map(|d| d.on_leave).collect(),
            avg_hours: days.iter().map(|d| d.avg_hours).collect(),
        }
    }
}

/// Counters for the "today" stat tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodayStats {
    pub total_employees: usize,
    pub present: usize,
    pub absent: usize,
    pub on_leave: usize,
}

/// Per-day counts over `input.range`.
///
/// Absence is `total - present - on_leave`, clamped at zero. Weekends and
/// holidays are not excluded, so the chart can show absences on days the
/// detailed reports classify as week-offs.
pub fn build_daily_stats(input: &ReportInput<'_>, options: &ReportOptions) -> Vec<DailyStats> {
    let index = EventIndex::build(input.events, options.utc_offset);
    input.range.days().map(|date| daily_stats(input, &index, date)).collect()
}

/// Build the chart series over `input.range`.
pub fn build_trend(input: &ReportInput<'_>, options: &ReportOptions) -> AttendanceTrend {
    AttendanceTrend::from_days(&build_daily_stats(input, options))
}

/// Stat tiles for `today`, independent of the selected range.
///
/// `input.events` and `input.leaves` must cover `today`; the dashboard
/// fetches the selected range widened to include the current day.
pub fn today_stats(input: &ReportInput<'_>, options: &ReportOptions, today: NaiveDate) -> TodayStats {
    let index = EventIndex::build(input.events, options.utc_offset);
    let stats = daily_stats(input, &index, today);

    TodayStats {
        total_employees: input.selected_users().count(),
        present: stats.present,
        absent: stats.absent,
        on_leave: stats.on_leave,
    }
}

/// `max(0, total - present - on_leave)`.
pub fn absent_count(total: usize, present: usize, on_leave: usize) -> usize {
    total.saturating_sub(present).saturating_sub(on_leave)
}

fn daily_stats(input: &ReportInput<'_>, index: &EventIndex<'_>, date: NaiveDate) -> DailyStats {
    let mut total = 0;
    let mut present = 0;
    let mut worked_seconds = 0i64;

    for user in input.selected_users() {
        total += 1;
        if let Some(day) = index.get(&user.id, date) {
            present += 1;
            if let Some(elapsed) = day.elapsed() {
                worked_seconds += elapsed.num_seconds();
            }
        }
    }

    let on_leave: HashSet<&str> = input
        .leaves
        .iter()
        .filter(|leave| leave.covers(date) && input.is_selected(&leave.user_id))
        .map(|leave| leave.user_id.as_str())
        .collect();

    let avg_hours = if present == 0 {
        0.0
    } else {
        round_one_decimal(worked_seconds as f64 / 3600.0 / present as f64)
    };

    DailyStats {
        date,
        present,
        absent: absent_count(total, present, on_leave.len()),
        on_leave: on_leave.len(),
        avg_hours,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_count_never_negative() {
        assert_eq!(absent_count(5, 4, 3), 0);
        assert_eq!(absent_count(5, 2, 1), 2);
        assert_eq!(absent_count(0, 0, 0), 0);
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(8.25), 8.3);
        assert_eq!(round_one_decimal(7.94), 7.9);
        assert_eq!(round_one_decimal(0.0), 0.0);
    }
}
