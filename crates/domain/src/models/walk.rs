//! Walk domain model.
//!
//! A walk is one excursion: the tracker left a geozone (EXIT) and later came
//! back into the same geozone (ENTRY).

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geofence_event::GeofenceEvent;

/// Minimum duration for a walk to count toward challenges (10 minutes).
pub const MIN_WALK_DURATION_SECONDS: i64 = 600;

/// Minimum duration for a walk to count as a long walk (15 minutes).
pub const LONG_WALK_DURATION_SECONDS: i64 = 900;

/// Namespace for deterministic walk ids.
const WALK_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a43_8d5e_4b1a_9c37_0e5d_2b8a_7f41);

/// A reconciled EXIT → ENTRY pair for one device and geozone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Walk {
    pub id: Uuid,
    pub device_id: String,
    /// Pet name as reported by the tracker.
    pub device_name: String,
    pub geozone_name: String,
    pub exit_event: GeofenceEvent,
    pub entry_event: GeofenceEvent,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub is_valid: bool,
    pub distance_meters: f64,
    /// Empty until attribution assigns an owner.
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_tax_id: String,
}

impl Walk {
    /// Join an EXIT event with the ENTRY event that closes it.
    ///
    /// Callers guarantee both events share device and geozone and that the
    /// entry happened after the exit.
    pub fn from_events(exit_event: GeofenceEvent, entry_event: GeofenceEvent) -> Self {
        debug_assert!(exit_event.is_exit() && entry_event.is_entry());
        debug_assert_eq!(exit_event.zone_key(), entry_event.zone_key());

        let duration_ms = entry_event.created_at_ms - exit_event.created_at_ms;
        // Timestamps are positive and ordered, so flooring equals truncation.
        let duration_seconds = duration_ms / 1000;

        let distance_meters = shared::geo::haversine_distance_meters(
            exit_event.lat,
            exit_event.lng,
            entry_event.lat,
            entry_event.lng,
        );

        let id = Uuid::new_v5(
            &WALK_ID_NAMESPACE,
            format!(
                "{}:{}:{}",
                exit_event.device_id, exit_event.id, entry_event.id
            )
            .as_bytes(),
        );

        Self {
            id,
            device_id: exit_event.device_id.clone(),
            device_name: entry_event.device_name.clone(),
            geozone_name: exit_event.geozone_name.clone(),
            start_time: millis_to_utc(exit_event.created_at_ms),
            end_time: millis_to_utc(entry_event.created_at_ms),
            duration_seconds,
            is_valid: duration_seconds >= MIN_WALK_DURATION_SECONDS,
            distance_meters,
            exit_event,
            entry_event,
            user_id: String::new(),
            user_tax_id: String::new(),
        }
    }

    /// Whole minutes walked, as shown on dashboards.
    pub fn duration_minutes(&self) -> i64 {
        self.duration_seconds / 60
    }

    pub fn is_long(&self) -> bool {
        self.duration_seconds >= LONG_WALK_DURATION_SECONDS
    }

    pub fn is_attributed(&self) -> bool {
        !self.user_id.is_empty()
    }

    /// Calendar date the walk started on, in the given offset.
    pub fn start_date(&self, offset: &FixedOffset) -> NaiveDate {
        self.start_time.with_timezone(offset).date_naive()
    }
}

fn millis_to_utc(millis: i64) -> DateTime<Utc> {
    // Event timestamps are validated at ingestion; anything else is a caller bug.
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_else(|| panic!("event timestamp out of range: {millis}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlarmType;

    fn event(id: i64, alarm_type: AlarmType, created_at_ms: i64) -> GeofenceEvent {
        GeofenceEvent {
            id,
            device_id: "42".to_string(),
            device_name: "Pipoca".to_string(),
            geozone_name: "Casa".to_string(),
            alarm_type,
            created_at_ms,
            lat: 38.7223,
            lng: -9.1393,
        }
    }

    #[test]
    fn test_from_events_duration_and_validity() {
        let walk = Walk::from_events(
            event(1, AlarmType::Exit, 1_700_000_000_000),
            event(2, AlarmType::Entry, 1_700_000_700_000),
        );

        assert_eq!(walk.duration_seconds, 700);
        assert_eq!(walk.duration_minutes(), 11);
        assert!(walk.is_valid);
        assert!(!walk.is_long());
        assert!(!walk.is_attributed());
        assert_eq!(walk.start_time.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(walk.end_time.timestamp_millis(), 1_700_000_700_000);
    }

    #[test]
    fn test_duration_floors_partial_seconds() {
        let walk = Walk::from_events(
            event(1, AlarmType::Exit, 1_700_000_000_000),
            event(2, AlarmType::Entry, 1_700_000_599_999),
        );

        assert_eq!(walk.duration_seconds, 599);
        assert!(!walk.is_valid);
    }

    #[test]
    fn test_validity_boundary() {
        let exactly = Walk::from_events(
            event(1, AlarmType::Exit, 1_700_000_000_000),
            event(2, AlarmType::Entry, 1_700_000_600_000),
        );
        assert!(exactly.is_valid);
    }

    #[test]
    fn test_id_is_deterministic() {
        let a = Walk::from_events(
            event(1, AlarmType::Exit, 1_700_000_000_000),
            event(2, AlarmType::Entry, 1_700_000_700_000),
        );
        let b = Walk::from_events(
            event(1, AlarmType::Exit, 1_700_000_000_000),
            event(2, AlarmType::Entry, 1_700_000_700_000),
        );
        let c = Walk::from_events(
            event(1, AlarmType::Exit, 1_700_000_000_000),
            event(3, AlarmType::Entry, 1_700_000_700_000),
        );

        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_distance_between_points() {
        let mut entry = event(2, AlarmType::Entry, 1_700_000_700_000);
        entry.lat += 0.01;
        let walk = Walk::from_events(event(1, AlarmType::Exit, 1_700_000_000_000), entry);

        assert!((walk.distance_meters - 1_111.95).abs() < 1.0);
    }

    #[test]
    fn test_start_date_respects_offset() {
        // 2024-03-31T23:30:00Z is already April 1st at UTC+1.
        let start = DateTime::parse_from_rfc3339("2024-03-31T23:30:00Z")
            .unwrap()
            .timestamp_millis();
        let walk = Walk::from_events(
            event(1, AlarmType::Exit, start),
            event(2, AlarmType::Entry, start + 700_000),
        );

        let utc = FixedOffset::east_opt(0).unwrap();
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(walk.start_date(&utc), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(walk.start_date(&plus_one), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }
}
