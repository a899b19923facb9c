//! Position sample domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::geometry::Coordinate;
use validator::Validate;

/// One fix from a position source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PositionSample {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    /// Horizontal accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy: Option<f64>,

    /// Milliseconds since epoch.
    #[validate(custom(function = "shared::validation::validate_timestamp"))]
    pub timestamp_millis: i64,
}

impl PositionSample {
    pub fn new(coordinate: Coordinate, accuracy: Option<f64>, at: DateTime<Utc>) -> Self {
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            accuracy,
            timestamp_millis: at.timestamp_millis(),
        }
    }

    /// A sample stamped with the current time.
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::new(Coordinate::new(latitude, longitude), None, Utc::now())
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_deserialization() {
        let json = r#"{
            "latitude": 18.95,
            "longitude": 72.75,
            "accuracy": 12.5,
            "timestampMillis": 1701878400000
        }"#;

        let sample: PositionSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.coordinate(), Coordinate::new(18.95, 72.75));
        assert_eq!(sample.accuracy, Some(12.5));
        assert_eq!(
            sample.captured_at().unwrap().timestamp_millis(),
            1701878400000
        );
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn test_accuracy_is_optional() {
        let json = r#"{"latitude": 1.0, "longitude": 2.0, "timestampMillis": 1701878400000}"#;
        let sample: PositionSample = serde_json::from_str(json).unwrap();
        assert!(sample.accuracy.is_none());
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn test_invalid_sample_fails_validation() {
        let mut sample = PositionSample::now(91.0, 72.0);
        assert!(sample.validate().is_err());

        sample.latitude = 18.0;
        sample.accuracy = Some(-3.0);
        assert!(sample.validate().is_err());
    }
}
