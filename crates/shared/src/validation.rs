//! Common validation utilities.

use chrono::{TimeZone, Utc};
use validator::ValidationError;

/// Maximum allowed future timestamp tolerance in seconds (5 minutes for clock skew).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 300;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that an event timestamp (milliseconds since epoch) is usable.
/// - Must be positive and representable as a UTC instant
/// - Must not be more than 5 minutes in the future (allows for clock skew)
///
/// There is no lower age bound: event syncs routinely backfill whole months.
pub fn validate_event_timestamp(timestamp_millis: i64) -> Result<(), ValidationError> {
    if timestamp_millis <= 0 {
        let mut err = ValidationError::new("timestamp_non_positive");
        err.message = Some("Timestamp must be positive".into());
        return Err(err);
    }

    let timestamp = match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(ts) => ts,
        None => {
            let mut err = ValidationError::new("timestamp_invalid");
            err.message = Some("Invalid timestamp format".into());
            return Err(err);
        }
    };

    let future_limit = Utc::now() + chrono::Duration::seconds(MAX_FUTURE_TOLERANCE_SECS);
    if timestamp > future_limit {
        let mut err = ValidationError::new("timestamp_future");
        err.message = Some("Timestamp cannot be in the future".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a calendar month number is within 1 to 12.
pub fn validate_month(month: u32) -> Result<(), ValidationError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        let mut err = ValidationError::new("month_range");
        err.message = Some("Month must be between 1 and 12".into());
        Err(err)
    }
}

/// Validates that a string identifier is not empty or whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}
