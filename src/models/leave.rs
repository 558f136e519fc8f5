//! Leave request DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Leave request approval state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Approved,
    Pending,
    Rejected,
    #[serde(other)]
    Other,
}

impl LeaveStatus {
    /// Query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Approved => "approved",
            LeaveStatus::Pending => "pending",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Other => "other",
        }
    }
}

/// Leave request spanning an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
}

impl LeaveRequest {
    /// Whether this request puts the user on leave for `date`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.status == LeaveStatus::Approved && self.start_date <= date && date <= self.end_date
    }
}
