//! Recurring holiday rules.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::user::StaffType;

/// Holiday on the nth given weekday of every month for one staff category.
///
/// `{ day = "Saturday", n = 2, type = "office" }` makes the second Saturday of
/// each month a holiday for office staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRule {
    pub day: Weekday,
    pub n: u32,
    #[serde(rename = "type")]
    pub staff_type: StaffType,
}

/// 1-based occurrence of the date's weekday within its month.
pub fn weekday_occurrence(date: NaiveDate) -> u32 {
    date.day().div_ceil(7)
}

impl HolidayRule {
    /// Whether the rule applies to `date` for an employee of `staff_type`.
    pub fn matches(&self, date: NaiveDate, staff_type: StaffType) -> bool {
        date.weekday() == self.day && weekday_occurrence(date) == self.n && staff_type == self.staff_type
    }
}

/// Whether any rule marks `date` as a holiday for `staff_type`.
pub fn is_holiday(rules: &[HolidayRule], date: NaiveDate, staff_type: StaffType) -> bool {
    rules.iter().any(|rule| rule.matches(date, staff_type))
}
