//! Attendance aggregation: day classification, trend series, and report builders.
//!
//! Everything here is a pure function of already-fetched data. Nothing
//! performs I/O or keeps state between calls; callers rebuild on every
//! change of range, user selection, or report type.

pub mod basic;
pub mod classify;
pub mod log;
pub mod monthly;
pub mod trend;

#[cfg(test)]
mod tests;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;
use crate::dates::DateRange;
use crate::models::{AttendanceEvent, HolidayRule, LeaveRequest, User};

pub use basic::{BasicReportRow, build_basic_report};
pub use classify::{DayEvents, DayRecord, EventIndex, classify_day, classify_events, format_duration};
pub use log::{AttendanceLogRow, build_log_report};
pub use monthly::{MonthlyReportRow, build_monthly_report};
pub use trend::{AttendanceTrend, DailyStats, TodayStats, absent_count, build_daily_stats, build_trend, today_stats};

/// Report selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Basic,
    Log,
    Monthly,
}

impl ReportType {
    /// Get the display name for the report.
    pub fn name(&self) -> &'static str {
        match self {
            ReportType::Basic => "Basic Report",
            ReportType::Log => "Attendance Log",
            ReportType::Monthly => "Monthly Report",
        }
    }

    /// Prefix for export file names.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ReportType::Basic => "attendance_basic",
            ReportType::Log => "attendance_log",
            ReportType::Monthly => "attendance_monthly",
        }
    }
}

/// Classification settings shared by all builders.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub holidays: Vec<HolidayRule>,
    /// Completed sessions shorter than this on a working day count as half days.
    pub half_day_threshold_minutes: Option<u32>,
    /// Offset used to place event timestamps on calendar days.
    pub utc_offset: FixedOffset,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            holidays: Vec::new(),
            half_day_threshold_minutes: None,
            utc_offset: Utc.fix(),
        }
    }
}

impl ReportOptions {
    /// Build options from the report section of the configuration and the holiday rules.
    pub fn from_config(report: &ReportConfig, holidays: &[HolidayRule]) -> Self {
        let utc_offset = report
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self {
            holidays: holidays.to_vec(),
            half_day_threshold_minutes: report.half_day_threshold_minutes,
            utc_offset,
        }
    }
}

/// Borrowed inputs for a report or trend computation.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub events: &'a [AttendanceEvent],
    pub leaves: &'a [LeaveRequest],
    pub users: &'a [User],
    pub range: DateRange,
    /// Restrict output to this user id; `None` means all users.
    pub selected_user: Option<&'a str>,
}

impl<'a> ReportInput<'a> {
    /// Users included by the current selection, in input order.
    pub fn selected_users(&self) -> impl Iterator<Item = &'a User> + use<'a> {
        let selected = self.selected_user;
        self.users
            .iter()
            .filter(move |u| selected.is_none_or(|id| u.id == id))
    }

    /// Whether `user_id` is part of the current selection.
    pub fn is_selected(&self, user_id: &str) -> bool {
        self.selected_users().any(|u| u.id == user_id)
    }
}
