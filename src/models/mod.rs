//! Data models for users, attendance events, leave requests, and holiday rules.

pub mod attendance;
pub mod holiday;
pub mod leave;
pub mod status;
pub mod user;

pub use attendance::{AttendanceEvent, Coordinates, EventType};
pub use holiday::{HolidayRule, is_holiday};
pub use leave::{LeaveRequest, LeaveStatus};
pub use status::DayStatus;
pub use user::{StaffType, User};
