//! Common validation utilities.

use chrono::{TimeZone, Utc};
use validator::ValidationError;

use crate::geometry::Coordinate;

/// Maximum allowed future timestamp tolerance in seconds (5 minutes for clock skew).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 300;

/// Minimum number of vertices for a boundary polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

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

/// Validates that accuracy is non-negative.
pub fn validate_accuracy(accuracy: f64) -> Result<(), ValidationError> {
    if accuracy >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("accuracy_range");
        err.message = Some("Accuracy must be non-negative".into());
        Err(err)
    }
}

/// Validates that a boundary warning distance (km) is finite and non-negative.
pub fn validate_warning_distance(km: f64) -> Result<(), ValidationError> {
    if km.is_finite() && km >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("warning_distance_range");
        err.message = Some("Warning distance must be a non-negative number of kilometers".into());
        Err(err)
    }
}

/// Validates a boundary polygon: at least three vertices, each in range.
///
/// Closure is implicit, so a repeated closing vertex does not count towards
/// the minimum.
pub fn validate_polygon(vertices: &[Coordinate]) -> Result<(), ValidationError> {
    let distinct = match (vertices.first(), vertices.last()) {
        (Some(first), Some(last)) if vertices.len() > 1 && first == last => vertices.len() - 1,
        _ => vertices.len(),
    };

    if distinct < MIN_POLYGON_VERTICES {
        let mut err = ValidationError::new("polygon_vertices");
        err.message = Some("Polygon must have at least 3 vertices".into());
        return Err(err);
    }

    for vertex in vertices {
        validate_latitude(vertex.latitude)?;
        validate_longitude(vertex.longitude)?;
    }

    Ok(())
}

/// Validates that a sample timestamp (milliseconds since epoch) is positive and
/// not more than 5 minutes in the future.
///
/// Old timestamps are accepted so recorded tracks can be replayed.
pub fn validate_timestamp(timestamp_millis: i64) -> Result<(), ValidationError> {
    if timestamp_millis <= 0 {
        let mut err = ValidationError::new("timestamp_invalid");
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
