//! Reverse-geocoding cache for the attendance log.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::client::AttendanceSource;
use crate::models::{AttendanceEvent, Coordinates};

/// Addresses keyed by coordinates rounded to 6 decimal places.
///
/// Lives as long as the view that owns it and is never persisted.
#[derive(Debug, Clone, Default)]
pub struct AddressCache {
    entries: HashMap<String, String>,
}

impl AddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached address for `coords`.
    pub fn get(&self, coords: &Coordinates) -> Option<&str> {
        self.entries.get(&coords.key()).map(String::as_str)
    }

    pub fn insert(&mut self, coords: &Coordinates, address: impl Into<String>) {
        self.entries.insert(coords.key(), address.into());
    }

    /// Take over every entry of `other`.
    pub fn extend(&mut self, other: AddressCache) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct event coordinates with no cached address, in first-seen order.
    pub fn unresolved<'a>(&self, events: impl IntoIterator<Item = &'a AttendanceEvent>) -> Vec<Coordinates> {
        let mut seen = HashSet::new();
        events
            .into_iter()
            .filter_map(AttendanceEvent::coordinates)
            .filter(|coords| {
                let key = coords.key();
                !self.entries.contains_key(&key) && seen.insert(key)
            })
            .collect()
    }

    /// Merge a batch lookup result, normalizing keys to 6 decimals.
    ///
    /// Returns the number of addresses added.
    fn merge(&mut self, requested: &[Coordinates], resolved: HashMap<String, String>) -> usize {
        let mut added = 0;
        for coords in requested {
            let key = coords.key();
            let address = resolved
                .get(&key)
                .or_else(|| resolved.get(&format!("{},{}", coords.lat, coords.lon)));
            if let Some(address) = address.filter(|a| !a.trim().is_empty()) {
                self.entries.insert(key, address.clone());
                added += 1;
            }
        }
        added
    }
}

/// Resolve addresses for every uncached coordinate in `events`.
///
/// Lookups run in batches of `batch_size`. A failed batch is logged and
/// skipped, leaving those rows to fall back to raw coordinates.
pub async fn resolve_addresses<S: AttendanceSource>(
    source: &S,
    cache: &mut AddressCache,
    events: &[AttendanceEvent],
    batch_size: usize,
) -> usize {
    let pending = cache.unresolved(events);
    if pending.is_empty() {
        debug!("All {} event locations already cached", cache.len());
        return 0;
    }

    let mut added = 0;
    for batch in pending.chunks(batch_size.max(1)) {
        match source.batch_resolve_addresses(batch).await {
            Ok(resolved) => added += cache.merge(batch, resolved),
            Err(e) => warn!("Address lookup failed for {} coordinates: {e}", batch.len()),
        }
    }

    debug!("Resolved {added} of {} pending addresses", pending.len());
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use chrono::Utc;

    fn event_at(lat: f64, lon: f64) -> AttendanceEvent {
        AttendanceEvent {
            user_id: "u1".to_string(),
            timestamp: Utc::now(),
            event_type: EventType::CheckIn,
            latitude: Some(lat),
            longitude: Some(lon),
            location_name: None,
        }
    }

    #[test]
    fn test_unresolved_dedups_and_skips_cached() {
        let mut cache = AddressCache::new();
        cache.insert(&Coordinates { lat: 1.0, lon: 2.0 }, "Known");

        let events = vec![
            event_at(1.0, 2.0),
            event_at(3.0, 4.0),
            event_at(3.0000001, 4.0),
            event_at(5.0, 6.0),
        ];
        let pending = cache.unresolved(&events);

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].key(), "3.000000,4.000000");
        assert_eq!(pending[1].key(), "5.000000,6.000000");
    }

    #[test]
    fn test_merge_ignores_blank_addresses() {
        let mut cache = AddressCache::new();
        let requested = [Coordinates { lat: 1.0, lon: 2.0 }, Coordinates { lat: 3.0, lon: 4.0 }];
        let resolved = HashMap::from([
            ("1.000000,2.000000".to_string(), "Main St".to_string()),
            ("3.000000,4.000000".to_string(), "  ".to_string()),
        ]);

        assert_eq!(cache.merge(&requested, resolved), 1);
        assert_eq!(cache.get(&requested[0]), Some("Main St"));
        assert_eq!(cache.get(&requested[1]), None);
    }
}
