//! Geofence event domain models and the tracker ingestion DTO.
//!
//! The tracker vendor reports the same field under several names depending on
//! the endpoint, so `TrackerEventPayload` accepts each known alias and is then
//! converted into the strictly typed `GeofenceEvent` the engines consume.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use validator::Validate;

/// Geofence alarm type reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlarmType {
    #[serde(rename = "GEOZONE_ENTRY", alias = "ENTRY")]
    Entry,
    #[serde(rename = "GEOZONE_EXIT", alias = "EXIT")]
    Exit,
}

impl AlarmType {
    /// Returns the string representation used by the tracker API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "GEOZONE_ENTRY",
            Self::Exit => "GEOZONE_EXIT",
        }
    }

    /// Parse from the tracker representation (case-insensitive, prefix optional).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GEOZONE_ENTRY" | "ENTRY" => Some(Self::Entry),
            "GEOZONE_EXIT" | "EXIT" => Some(Self::Exit),
            _ => None,
        }
    }
}

impl fmt::Display for AlarmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single geofence crossing observed by a tracker. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEvent {
    pub id: i64,
    pub device_id: String,
    pub device_name: String,
    pub geozone_name: String,
    pub alarm_type: AlarmType,
    pub created_at_ms: i64,
    pub lat: f64,
    pub lng: f64,
}

impl GeofenceEvent {
    /// Key identifying the device/geozone pair the event belongs to.
    pub fn zone_key(&self) -> (&str, &str) {
        (&self.device_id, &self.geozone_name)
    }

    pub fn is_exit(&self) -> bool {
        self.alarm_type == AlarmType::Exit
    }

    pub fn is_entry(&self) -> bool {
        self.alarm_type == AlarmType::Entry
    }
}

/// Error produced when a tracker payload cannot become a `GeofenceEvent`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventParseError {
    #[error("Unknown alarm type: {0}")]
    UnknownAlarmType(String),

    #[error("Invalid event: {0}")]
    Invalid(String),
}

/// Raw event as returned by the tracker API.
///
/// Device ids arrive either as numbers or strings; both are accepted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TrackerEventPayload {
    pub id: i64,

    #[serde(alias = "deviceId", deserialize_with = "string_or_number")]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub device_id: String,

    #[serde(default, alias = "deviceName")]
    pub device_name: Option<String>,

    #[serde(alias = "geozoneName", alias = "geozone")]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub geozone_name: String,

    #[serde(alias = "alarmType", alias = "type")]
    pub alarm_type: String,

    #[serde(alias = "createdAt", alias = "created_at")]
    #[validate(custom(function = "shared::validation::validate_event_timestamp"))]
    pub created: i64,

    #[serde(alias = "latitude")]
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub lat: f64,

    #[serde(alias = "longitude", alias = "lon")]
    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub lng: f64,
}

impl TryFrom<TrackerEventPayload> for GeofenceEvent {
    type Error = EventParseError;

    fn try_from(payload: TrackerEventPayload) -> Result<Self, Self::Error> {
        payload
            .validate()
            .map_err(|e| EventParseError::Invalid(e.to_string()))?;

        let alarm_type = AlarmType::parse(&payload.alarm_type)
            .ok_or_else(|| EventParseError::UnknownAlarmType(payload.alarm_type.clone()))?;

        Ok(Self {
            id: payload.id,
            device_name: payload
                .device_name
                .unwrap_or_else(|| payload.device_id.clone()),
            device_id: payload.device_id,
            geozone_name: payload.geozone_name,
            alarm_type,
            created_at_ms: payload.created,
            lat: payload.lat,
            lng: payload.lng,
        })
    }
}

/// A payload that failed conversion, kept for logging.
#[derive(Debug, Clone)]
pub struct RejectedEvent {
    pub id: Option<i64>,
    pub error: EventParseError,
}

/// Result of parsing a batch of raw tracker payloads.
#[derive(Debug, Clone, Default)]
pub struct ParsedEvents {
    pub events: Vec<GeofenceEvent>,
    pub rejected: Vec<RejectedEvent>,
}

/// Parse raw JSON event values into typed events.
///
/// Each value is handled independently: a malformed value is recorded in
/// `rejected` and never aborts the batch.
pub fn parse_events(values: Vec<serde_json::Value>) -> ParsedEvents {
    let mut parsed = ParsedEvents::default();

    for value in values {
        let id = value.get("id").and_then(|v| v.as_i64());
        let result = serde_json::from_value::<TrackerEventPayload>(value)
            .map_err(|e| EventParseError::Invalid(e.to_string()))
            .and_then(GeofenceEvent::try_from);

        match result {
            Ok(event) => parsed.events.push(event),
            Err(error) => {
                tracing::warn!(event_id = ?id, error = %error, "Rejected tracker event");
                parsed.rejected.push(RejectedEvent { id, error });
            }
        }
    }

    parsed
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Str(s) => Ok(s),
        Raw::Int(n) => Ok(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recent_millis() -> i64 {
        chrono::Utc::now().timestamp_millis() - 60_000
    }

    #[test]
    fn test_alarm_type_parse() {
        assert_eq!(AlarmType::parse("GEOZONE_ENTRY"), Some(AlarmType::Entry));
        assert_eq!(AlarmType::parse("geozone_exit"), Some(AlarmType::Exit));
        assert_eq!(AlarmType::parse("Exit"), Some(AlarmType::Exit));
        assert_eq!(AlarmType::parse("SPEED"), None);
    }

    #[test]
    fn test_alarm_type_as_str() {
        assert_eq!(AlarmType::Entry.as_str(), "GEOZONE_ENTRY");
        assert_eq!(AlarmType::Exit.to_string(), "GEOZONE_EXIT");
    }

    #[test]
    fn test_payload_snake_case_fields() {
        let created = recent_millis();
        let value = json!({
            "id": 17,
            "device_id": 9001,
            "device_name": "Bolinhas",
            "geozone_name": "Casa",
            "alarm_type": "GEOZONE_EXIT",
            "created": created,
            "lat": 38.72,
            "lng": -9.14
        });

        let payload: TrackerEventPayload = serde_json::from_value(value).unwrap();
        let event = GeofenceEvent::try_from(payload).unwrap();

        assert_eq!(event.device_id, "9001");
        assert_eq!(event.device_name, "Bolinhas");
        assert_eq!(event.alarm_type, AlarmType::Exit);
        assert_eq!(event.created_at_ms, created);
    }

    #[test]
    fn test_payload_camel_case_aliases() {
        let value = json!({
            "id": 18,
            "deviceId": "abc",
            "geozoneName": "Casa",
            "alarmType": "ENTRY",
            "createdAt": recent_millis(),
            "latitude": 38.72,
            "longitude": -9.14
        });

        let payload: TrackerEventPayload = serde_json::from_value(value).unwrap();
        let event = GeofenceEvent::try_from(payload).unwrap();

        assert_eq!(event.device_id, "abc");
        // Falls back to the device id when the tracker omits the name.
        assert_eq!(event.device_name, "abc");
        assert!(event.is_entry());
    }

    #[test]
    fn test_unknown_alarm_type_rejected() {
        let payload = TrackerEventPayload {
            id: 1,
            device_id: "1".to_string(),
            device_name: None,
            geozone_name: "Casa".to_string(),
            alarm_type: "LOW_BATTERY".to_string(),
            created: recent_millis(),
            lat: 0.0,
            lng: 0.0,
        };

        assert_eq!(
            GeofenceEvent::try_from(payload).unwrap_err(),
            EventParseError::UnknownAlarmType("LOW_BATTERY".to_string())
        );
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let payload = TrackerEventPayload {
            id: 1,
            device_id: "1".to_string(),
            device_name: None,
            geozone_name: "Casa".to_string(),
            alarm_type: "EXIT".to_string(),
            created: recent_millis(),
            lat: 123.0,
            lng: 0.0,
        };

        assert!(matches!(
            GeofenceEvent::try_from(payload),
            Err(EventParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_blank_geozone_rejected() {
        let payload = TrackerEventPayload {
            id: 1,
            device_id: "1".to_string(),
            device_name: None,
            geozone_name: " ".to_string(),
            alarm_type: "EXIT".to_string(),
            created: recent_millis(),
            lat: 0.0,
            lng: 0.0,
        };

        assert!(GeofenceEvent::try_from(payload).is_err());
    }

    #[test]
    fn test_parse_events_keeps_going_after_reject() {
        let created = recent_millis();
        let values = vec![
            json!({"id": 1, "device_id": 5, "geozone_name": "Casa", "alarm_type": "GEOZONE_EXIT",
                   "created": created, "lat": 1.0, "lng": 1.0}),
            json!({"id": 2, "device_id": 5, "geozone_name": "Casa", "alarm_type": "GEOZONE_EXIT"}),
            json!({"id": 3, "device_id": 5, "geozone_name": "Casa", "alarm_type": "BOGUS",
                   "created": created, "lat": 1.0, "lng": 1.0}),
            json!({"id": 4, "device_id": 5, "geozone_name": "Casa", "alarm_type": "GEOZONE_ENTRY",
                   "created": created + 1000, "lat": 1.0, "lng": 1.0}),
        ];

        let parsed = parse_events(values);

        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.rejected.len(), 2);
        assert_eq!(parsed.rejected[0].id, Some(2));
        assert_eq!(
            parsed.rejected[1].error,
            EventParseError::UnknownAlarmType("BOGUS".to_string())
        );
    }

    #[test]
    fn test_event_serialization_camel_case() {
        let event = GeofenceEvent {
            id: 1,
            device_id: "7".to_string(),
            device_name: "Rex".to_string(),
            geozone_name: "Casa".to_string(),
            alarm_type: AlarmType::Exit,
            created_at_ms: 1_700_000_000_000,
            lat: 1.0,
            lng: 2.0,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"alarmType\":\"GEOZONE_EXIT\""));
        assert!(json.contains("\"createdAtMs\":1700000000000"));
    }
}
