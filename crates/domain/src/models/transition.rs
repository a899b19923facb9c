//! Boundary transition alerts raised by comparing consecutive samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alert::alert_id;
use super::boundary::{BoundaryType, BoundaryZone, Severity};
use super::position::PositionSample;

/// Transition between two consecutive samples for one boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    GeofenceEntry,
    GeofenceExit,
    /// Still inside a restricted zone; raised on every sample.
    BoundaryWarning,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeofenceEntry => "geofence_entry",
            Self::GeofenceExit => "geofence_exit",
            Self::BoundaryWarning => "boundary_warning",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "geofence_entry" => Some(Self::GeofenceEntry),
            "geofence_exit" => Some(Self::GeofenceExit),
            "boundary_warning" => Some(Self::BoundaryWarning),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    pub boundary_id: String,
    pub boundary_name: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub location: PositionSample,
    pub is_active: bool,
}

impl TransitionAlert {
    pub fn new(
        kind: TransitionKind,
        boundary: &BoundaryZone,
        location: PositionSample,
        at: DateTime<Utc>,
    ) -> Self {
        let severity = if boundary.boundary_type == BoundaryType::Restricted {
            Severity::High
        } else {
            Severity::Medium
        };

        let (title, description) = match kind {
            TransitionKind::GeofenceEntry => (
                format!("Entered {}", boundary.name),
                format!("You have entered the {}. {}", boundary.name, boundary.description),
            ),
            TransitionKind::GeofenceExit => (
                format!("Exited {}", boundary.name),
                format!("You have exited the {}. {}", boundary.name, boundary.description),
            ),
            TransitionKind::BoundaryWarning => (
                format!("Warning: {}", boundary.name),
                format!(
                    "Warning: You are in a restricted area ({}). Please exit immediately.",
                    boundary.name
                ),
            ),
        };

        Self {
            id: alert_id(kind.as_str(), &boundary.id, at),
            kind,
            boundary_id: boundary.id.clone(),
            boundary_name: boundary.name.clone(),
            severity,
            title,
            description,
            timestamp: at,
            location,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::geometry::Coordinate;

    fn zone(boundary_type: BoundaryType) -> BoundaryZone {
        BoundaryZone {
            id: "pakistan-boundary".to_string(),
            name: "India-Pakistan Maritime Boundary".to_string(),
            boundary_type,
            severity: Severity::High,
            coordinates: vec![
                Coordinate::new(23.8, 68.0),
                Coordinate::new(24.5, 67.0),
                Coordinate::new(25.0, 66.5),
            ],
            warning_distance: 5.0,
            description: "International maritime boundary between India and Pakistan".to_string(),
            consequences: None,
        }
    }

    #[test]
    fn test_restricted_boundary_is_high_severity() {
        let alert = TransitionAlert::new(
            TransitionKind::GeofenceEntry,
            &zone(BoundaryType::Restricted),
            PositionSample::now(24.0, 67.5),
            Utc::now(),
        );
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.title, "Entered India-Pakistan Maritime Boundary");
        assert!(alert.is_active);
    }

    #[test]
    fn test_other_boundaries_are_medium_severity() {
        // Severity follows the boundary type, not the boundary's own severity
        let alert = TransitionAlert::new(
            TransitionKind::GeofenceExit,
            &zone(BoundaryType::Military),
            PositionSample::now(24.0, 67.5),
            Utc::now(),
        );
        assert_eq!(alert.severity, Severity::Medium);
        assert_eq!(
            alert.description,
            "You have exited the India-Pakistan Maritime Boundary. International maritime boundary between India and Pakistan"
        );
    }

    #[test]
    fn test_transition_kind_serialization() {
        let json = serde_json::to_string(&TransitionKind::BoundaryWarning).unwrap();
        assert_eq!(json, "\"boundary_warning\"");
        assert_eq!(
            TransitionKind::parse("GEOFENCE_ENTRY"),
            Some(TransitionKind::GeofenceEntry)
        );
        assert_eq!(TransitionKind::parse("dwell"), None);
    }
}
