//! Derived per-day attendance status.

use serde::Serialize;

/// Attendance outcome for one user on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DayStatus {
    Present,
    HalfDay,
    Absent,
    WeekOff,
    Holiday,
    WeekendPresent,
    HolidayPresent,
    NotApplicable,
}

impl DayStatus {
    /// Short code used in the monthly grid.
    pub fn code(&self) -> &'static str {
        match self {
            DayStatus::Present => "P",
            DayStatus::HalfDay => "1/2P",
            DayStatus::Absent => "A",
            DayStatus::WeekOff => "WO",
            DayStatus::Holiday => "H",
            DayStatus::WeekendPresent => "WOP",
            DayStatus::HolidayPresent => "HP",
            DayStatus::NotApplicable => "-",
        }
    }

    /// Human-readable label used in the basic report.
    pub fn label(&self) -> &'static str {
        match self {
            DayStatus::Present => "Present",
            DayStatus::HalfDay => "Half Day",
            DayStatus::Absent => "Absent",
            DayStatus::WeekOff => "Week Off",
            DayStatus::Holiday => "Holiday",
            DayStatus::WeekendPresent => "Weekend Present",
            DayStatus::HolidayPresent => "Holiday Present",
            DayStatus::NotApplicable => "N/A",
        }
    }
}
