//! Basic report: one row per user per day.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use super::classify::{EventIndex, classify_day, format_duration};
use super::{ReportInput, ReportOptions};
use crate::models::DayStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicReportRow {
    pub user_id: String,
    pub user_name: String,
    pub date: NaiveDate,
    pub status: DayStatus,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    /// Formatted as `{hours}h {minutes}m`, absent for incomplete sessions.
    pub duration: Option<String>,
}

/// Build the basic report, ordered by date and then by user order.
pub fn build_basic_report(input: &ReportInput<'_>, options: &ReportOptions) -> Vec<BasicReportRow> {
    let index = EventIndex::build(input.events, options.utc_offset);
    let users: Vec<_> = input.selected_users().collect();
    let mut rows = Vec::with_capacity(users.len() * input.range.len());

    for date in input.range.days() {
        for user in &users {
            let record = classify_day(date, index.get(&user.id, date), user.staff_type(), options);
            rows.push(BasicReportRow {
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                date,
                status: record.status,
                check_in: record.check_in_time(options.utc_offset),
                check_out: record.check_out_time(options.utc_offset),
                duration: record.duration.map(format_duration),
            });
        }
    }

    rows
}
