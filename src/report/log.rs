//! Attendance log: one row per raw event.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use super::{ReportInput, ReportOptions};
use crate::geocode::AddressCache;
use crate::models::{AttendanceEvent, EventType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceLogRow {
    pub user_id: String,
    pub user_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub event_type: EventType,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Build the log of events for the selected users within the range, sorted by date and time.
pub fn build_log_report(
    input: &ReportInput<'_>,
    options: &ReportOptions,
    addresses: &AddressCache,
) -> Vec<AttendanceLogRow> {
    let mut rows: Vec<AttendanceLogRow> = input
        .events
        .iter()
        .filter_map(|event| {
            let date = event.local_date(options.utc_offset);
            if !input.range.contains(date) {
                return None;
            }
            let user = input.selected_users().find(|u| u.id == event.user_id)?;
            Some(AttendanceLogRow {
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                date,
                time: event.local_time(options.utc_offset),
                event_type: event.event_type,
                address: display_address(event, addresses),
                latitude: event.latitude,
                longitude: event.longitude,
            })
        })
        .collect();

    rows.sort_by_key(|row| (row.date, row.time));
    rows
}

/// Resolved address, else the recorded location name, else raw coordinates.
fn display_address(event: &AttendanceEvent, addresses: &AddressCache) -> String {
    if let Some(coords) = event.coordinates()
        && let Some(address) = addresses.get(&coords)
    {
        return address.to_string();
    }
    if let Some(name) = event.location_name.as_deref().filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }
    match event.coordinates() {
        Some(coords) => format!("{:.6}, {:.6}", coords.lat, coords.lon),
        None => "-".to_string(),
    }
}
