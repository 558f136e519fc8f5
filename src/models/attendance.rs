//! Attendance event DTOs.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of attendance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "check-in")]
    CheckIn,
    #[serde(rename = "check-out")]
    CheckOut,
}

impl EventType {
    /// Wire name, also used in exported reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CheckIn => "check-in",
            EventType::CheckOut => "check-out",
        }
    }
}

/// Raw attendance event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location_name: Option<String>,
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Cache key with both components rounded to 6 decimal places.
    pub fn key(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lon)
    }
}

impl AttendanceEvent {
    /// Calendar day of the event in the given offset.
    pub fn local_date(&self, offset: FixedOffset) -> NaiveDate {
        self.timestamp.with_timezone(&offset).date_naive()
    }

    /// Wall-clock time of the event in the given offset.
    pub fn local_time(&self, offset: FixedOffset) -> NaiveTime {
        self.timestamp.with_timezone(&offset).time()
    }

    /// Coordinates, when both components were recorded.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        }
    }

    pub fn is_check_in(&self) -> bool {
        self.event_type == EventType::CheckIn
    }

    pub fn is_check_out(&self) -> bool {
        self.event_type == EventType::CheckOut
    }
}
