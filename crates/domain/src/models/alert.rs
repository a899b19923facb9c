//! Geofence alert domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::geometry::Coordinate;
use uuid::Uuid;

use super::boundary::{BoundaryZone, Severity};

/// Classification of a geofence alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    /// The vessel is inside the boundary.
    Violation,
    /// The vessel is outside but within the boundary's warning distance.
    Approaching,
    /// Repeated signal while the vessel remains inside a restricted zone.
    Warning,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Violation => "violation",
            Self::Approaching => "approaching",
            Self::Warning => "warning",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "violation" => Some(Self::Violation),
            "approaching" => Some(Self::Approaching),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }

    /// Display priority: violation = 3, approaching = 2, warning = 1.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Violation => 3,
            Self::Approaching => 2,
            Self::Warning => 1,
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An alert emitted for one boundary on one position sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceAlert {
    pub id: String,
    pub boundary_id: String,
    pub boundary_name: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    /// Kilometers; exactly 0 when inside.
    pub distance: f64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub user_location: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequences: Option<String>,
}

impl GeofenceAlert {
    /// Alert for a position inside `boundary`.
    pub fn violation(boundary: &BoundaryZone, location: Coordinate, at: DateTime<Utc>) -> Self {
        let advice = boundary
            .consequences
            .as_deref()
            .unwrap_or("Immediate exit recommended.");

        Self::build(
            AlertType::Violation,
            boundary,
            0.0,
            format!("You are currently inside {}. {}", boundary.name, advice),
            location,
            at,
        )
    }

    /// Alert for a position within `boundary`'s warning distance.
    pub fn approaching(
        boundary: &BoundaryZone,
        location: Coordinate,
        distance: f64,
        at: DateTime<Utc>,
    ) -> Self {
        Self::build(
            AlertType::Approaching,
            boundary,
            distance,
            format!(
                "Approaching {}. Distance: {:.2}km. {}",
                boundary.name, distance, boundary.description
            ),
            location,
            at,
        )
    }

    /// Alert for a vessel that stays inside a restricted zone.
    pub fn warning(boundary: &BoundaryZone, location: Coordinate, at: DateTime<Utc>) -> Self {
        Self::build(
            AlertType::Warning,
            boundary,
            0.0,
            format!(
                "Warning: You are in a restricted area ({}). Please exit immediately.",
                boundary.name
            ),
            location,
            at,
        )
    }

    fn build(
        alert_type: AlertType,
        boundary: &BoundaryZone,
        distance: f64,
        message: String,
        location: Coordinate,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: alert_id(alert_type.as_str(), &boundary.id, at),
            boundary_id: boundary.id.clone(),
            boundary_name: boundary.name.clone(),
            alert_type,
            severity: boundary.severity,
            distance,
            message,
            timestamp: at,
            user_location: location,
            consequences: boundary.consequences.clone(),
        }
    }
}

/// Builds a unique alert id: `{kind}-{boundary}-{millis}-{suffix}`.
///
/// The random suffix keeps ids unique when a boundary alerts twice within the
/// same millisecond.
pub fn alert_id(kind: &str, boundary_id: &str, at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}-{}",
        kind,
        boundary_id,
        at.timestamp_millis(),
        &suffix[..8]
    )
}

/// A boundary the vessel is near but outside of.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyBoundary {
    pub boundary: BoundaryZone,
    pub distance: f64,
    pub is_approaching: bool,
}

/// Result of evaluating one position against the registry.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceStatus {
    pub is_inside_boundary: bool,
    pub nearby_boundaries: Vec<NearbyBoundary>,
    pub active_alerts: Vec<GeofenceAlert>,
}

impl GeofenceStatus {
    pub fn has_alerts(&self) -> bool {
        !self.active_alerts.is_empty()
    }
}
