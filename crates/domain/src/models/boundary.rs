//! Maritime boundary zone domain model.

use geo::{BoundingRect, Centroid};
use serde::{Deserialize, Serialize};
use shared::geometry::{distance_to_polygon, point_in_polygon, Coordinate};
use validator::Validate;

/// Kind of maritime boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    Territorial,
    Eez,
    Restricted,
    Military,
    Conservation,
}

impl BoundaryType {
    /// Converts to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryType::Territorial => "territorial",
            BoundaryType::Eez => "eez",
            BoundaryType::Restricted => "restricted",
            BoundaryType::Military => "military",
            BoundaryType::Conservation => "conservation",
        }
    }

    /// Parses from string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "territorial" => Some(BoundaryType::Territorial),
            "eez" => Some(BoundaryType::Eez),
            "restricted" => Some(BoundaryType::Restricted),
            "military" => Some(BoundaryType::Military),
            "conservation" => Some(BoundaryType::Conservation),
            _ => None,
        }
    }
}

impl std::fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity shared by boundaries and the alerts they raise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }

    /// Display priority: high = 3, medium = 2, low = 1.
    pub fn priority(&self) -> u8 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named maritime polygon with its alerting policy.
///
/// `coordinates` is implicitly closed; repeating the first vertex at the end
/// is allowed but not required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryZone {
    #[validate(length(min = 1, max = 100, message = "Id must be 1-100 characters"))]
    pub id: String,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    pub boundary_type: BoundaryType,

    pub severity: Severity,

    #[validate(length(min = 3, message = "Polygon must have at least 3 vertices"))]
    pub coordinates: Vec<Coordinate>,

    /// Proximity threshold in kilometers.
    #[validate(custom(function = "shared::validation::validate_warning_distance"))]
    pub warning_distance: f64,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequences: Option<String>,
}

/// Axis-aligned bounds of a boundary polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryBounds {
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
}

impl BoundaryZone {
    /// Whether the position lies inside the polygon.
    pub fn contains(&self, position: Coordinate) -> bool {
        point_in_polygon(position, &self.coordinates)
    }

    /// Distance in kilometers from the position to the polygon, 0 when inside.
    pub fn distance_from(&self, position: Coordinate) -> f64 {
        distance_to_polygon(position, &self.coordinates)
    }

    /// High severity, military and restricted zones need constant monitoring.
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::High
            || matches!(
                self.boundary_type,
                BoundaryType::Military | BoundaryType::Restricted
            )
    }

    /// The zone as a `geo` polygon (x = longitude, y = latitude).
    pub fn polygon(&self) -> geo::Polygon<f64> {
        let exterior: Vec<geo::Coord<f64>> =
            self.coordinates.iter().map(|c| geo::Coord::from(*c)).collect();
        geo::Polygon::new(geo::LineString::from(exterior), vec![])
    }

    pub fn bounds(&self) -> Option<BoundaryBounds> {
        self.polygon().bounding_rect().map(|rect| BoundaryBounds {
            min_latitude: rect.min().y,
            min_longitude: rect.min().x,
            max_latitude: rect.max().y,
            max_longitude: rect.max().x,
        })
    }

    /// Label anchor for map consumers.
    pub fn centroid(&self) -> Option<Coordinate> {
        self.polygon().centroid().map(Coordinate::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naval_zone() -> BoundaryZone {
        BoundaryZone {
            id: "kochi-naval-restricted".to_string(),
            name: "Kochi Naval Restricted Zone".to_string(),
            boundary_type: BoundaryType::Military,
            severity: Severity::High,
            coordinates: vec![
                Coordinate::new(9.9, 76.2),
                Coordinate::new(10.0, 76.3),
                Coordinate::new(10.1, 76.2),
                Coordinate::new(10.0, 76.1),
            ],
            warning_distance: 3.0,
            description: "Naval base restricted area - Kochi".to_string(),
            consequences: Some("Entry prohibited - Naval security enforcement".to_string()),
        }
    }

    #[test]
    fn test_boundary_type_round_trip_strings() {
        for t in [
            BoundaryType::Territorial,
            BoundaryType::Eez,
            BoundaryType::Restricted,
            BoundaryType::Military,
            BoundaryType::Conservation,
        ] {
            assert_eq!(BoundaryType::parse(t.as_str()), Some(t));
        }
        assert_eq!(BoundaryType::parse("EEZ"), Some(BoundaryType::Eez));
        assert_eq!(BoundaryType::parse("harbour"), None);
    }

    #[test]
    fn test_severity_priority_order() {
        assert!(Severity::High.priority() > Severity::Medium.priority());
        assert!(Severity::Medium.priority() > Severity::Low.priority());
        assert_eq!(Severity::parse("Medium"), Some(Severity::Medium));
    }

    #[test]
    fn test_zone_deserialization_uses_type_key() {
        let json = r#"{
            "id": "test-zone",
            "name": "Test Zone",
            "type": "restricted",
            "severity": "high",
            "coordinates": [
                {"latitude": 1.0, "longitude": 1.0},
                {"latitude": 1.0, "longitude": 2.0},
                {"latitude": 2.0, "longitude": 2.0}
            ],
            "warningDistance": 5,
            "description": "A test zone"
        }"#;

        let zone: BoundaryZone = serde_json::from_str(json).unwrap();
        assert_eq!(zone.boundary_type, BoundaryType::Restricted);
        assert_eq!(zone.warning_distance, 5.0);
        assert!(zone.consequences.is_none());
        assert!(zone.validate().is_ok());
    }

    #[test]
    fn test_zone_validation_rejects_short_polygon() {
        let mut zone = naval_zone();
        zone.coordinates.truncate(2);
        assert!(zone.validate().is_err());
    }

    #[test]
    fn test_zone_validation_rejects_negative_warning_distance() {
        let mut zone = naval_zone();
        zone.warning_distance = -1.0;
        assert!(zone.validate().is_err());
    }

    #[test]
    fn test_contains_and_distance() {
        let zone = naval_zone();
        assert!(zone.contains(Coordinate::new(10.0, 76.2)));
        assert_eq!(zone.distance_from(Coordinate::new(10.0, 76.2)), 0.0);
        assert!(!zone.contains(Coordinate::new(10.0, 76.5)));
        assert!(zone.distance_from(Coordinate::new(10.0, 76.5)) > 0.0);
    }

    #[test]
    fn test_is_critical() {
        let mut zone = naval_zone();
        assert!(zone.is_critical());

        zone.boundary_type = BoundaryType::Conservation;
        zone.severity = Severity::Medium;
        assert!(!zone.is_critical());

        zone.boundary_type = BoundaryType::Restricted;
        assert!(zone.is_critical());
    }

    #[test]
    fn test_bounds_and_centroid() {
        let zone = naval_zone();
        let bounds = zone.bounds().unwrap();
        assert_eq!(bounds.min_latitude, 9.9);
        assert_eq!(bounds.max_latitude, 10.1);
        assert_eq!(bounds.min_longitude, 76.1);
        assert_eq!(bounds.max_longitude, 76.3);

        let centroid = zone.centroid().unwrap();
        assert!((centroid.latitude - 10.0).abs() < 1e-9);
        assert!((centroid.longitude - 76.2).abs() < 1e-9);
    }
}
