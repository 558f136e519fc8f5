//! Monthly report: one row per user with a day-code grid and counters.

use serde::Serialize;

use super::classify::{EventIndex, classify_day};
use super::{ReportInput, ReportOptions};
use crate::models::DayStatus;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyReportRow {
    pub user_id: String,
    pub user_name: String,
    /// One status per day of the range, in date order.
    pub days: Vec<DayStatus>,
    pub present_days: u32,
    pub absent_days: u32,
    pub half_days: u32,
    pub week_offs: u32,
    pub holidays: u32,
    pub weekend_presents: u32,
    pub holiday_presents: u32,
    pub total_payable_days: f64,
}

impl MonthlyReportRow {
    fn tally(&mut self, status: DayStatus) {
        self.days.push(status);
        match status {
            DayStatus::Present => self.present_days += 1,
            DayStatus::HalfDay => self.half_days += 1,
            DayStatus::Absent => self.absent_days += 1,
            DayStatus::WeekOff => self.week_offs += 1,
            DayStatus::Holiday => self.holidays += 1,
            DayStatus::WeekendPresent => self.weekend_presents += 1,
            DayStatus::HolidayPresent => self.holiday_presents += 1,
            DayStatus::NotApplicable => {}
        }
    }

    /// Sum of all status counters.
    pub fn counted_days(&self) -> u32 {
        self.present_days
            + self.absent_days
            + self.half_days
            + self.week_offs
            + self.holidays
            + self.weekend_presents
            + self.holiday_presents
    }

    fn payable_days(&self) -> f64 {
        f64::from(self.present_days + self.week_offs + self.holidays + self.weekend_presents + self.holiday_presents)
            + 0.5 * f64::from(self.half_days)
    }

    /// Day codes in date order, e.g. `["P", "A", "WO"]`.
    pub fn codes(&self) -> Vec<&'static str> {
        self.days.iter().map(DayStatus::code).collect()
    }
}

/// Build one row per selected user across the whole range.
pub fn build_monthly_report(input: &ReportInput<'_>, options: &ReportOptions) -> Vec<MonthlyReportRow> {
    let index = EventIndex::build(input.events, options.utc_offset);

    input
        .selected_users()
        .map(|user| {
            let staff_type = user.staff_type();
            let mut row = MonthlyReportRow {
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                days: Vec::with_capacity(input.range.len()),
                ..Default::default()
            };
            for date in input.range.days() {
                let record = classify_day(date, index.get(&user.id, date), staff_type, options);
                row.tally(record.status);
            }
            row.total_payable_days = row.payable_days();
            row
        })
        .collect()
}
