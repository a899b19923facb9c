//! Read-only catalog of boundary zones.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};
use validator::Validate;

use crate::models::boundary::{BoundaryType, BoundaryZone, Severity};
use crate::services::builtin_boundaries::builtin_zones;

/// Errors raised while building a registry from boundary data.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid boundary {id}: {reason}")]
    InvalidBoundary { id: String, reason: String },

    #[error("Duplicate boundary id: {0}")]
    DuplicateId(String),

    #[error("Failed to parse boundary data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable set of boundary zones, kept in catalog order.
///
/// Evaluation walks zones in this order, so alert order within a sample is
/// the registry order.
#[derive(Debug, Clone)]
pub struct BoundaryRegistry {
    zones: Vec<BoundaryZone>,
}

impl BoundaryRegistry {
    /// Builds a registry, validating every zone eagerly.
    pub fn new(zones: Vec<BoundaryZone>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();

        for zone in &zones {
            zone.validate()
                .map_err(|e| RegistryError::InvalidBoundary {
                    id: zone.id.clone(),
                    reason: e.to_string(),
                })?;

            shared::validation::validate_polygon(&zone.coordinates).map_err(|e| {
                RegistryError::InvalidBoundary {
                    id: zone.id.clone(),
                    reason: e
                        .message
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                }
            })?;

            if !seen.insert(zone.id.as_str()) {
                return Err(RegistryError::DuplicateId(zone.id.clone()));
            }

            debug!(
                boundary_id = %zone.id,
                boundary_type = %zone.boundary_type,
                vertices = zone.coordinates.len(),
                "Registered boundary"
            );
        }

        Ok(Self { zones })
    }

    /// The built-in Indian maritime catalog.
    pub fn builtin() -> Self {
        let zones = builtin_zones();
        info!(count = zones.len(), "Loaded built-in boundary catalog");
        Self { zones }
    }

    /// Parses a JSON array of zones.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let zones: Vec<BoundaryZone> = serde_json::from_str(json)?;
        let registry = Self::new(zones)?;
        info!(count = registry.len(), "Loaded boundary catalog from JSON");
        Ok(registry)
    }

    pub fn all(&self) -> &[BoundaryZone] {
        &self.zones
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundaryZone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&BoundaryZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn by_type(&self, boundary_type: BoundaryType) -> Vec<&BoundaryZone> {
        self.zones
            .iter()
            .filter(|z| z.boundary_type == boundary_type)
            .collect()
    }

    pub fn high_severity(&self) -> Vec<&BoundaryZone> {
        self.zones
            .iter()
            .filter(|z| z.severity == Severity::High)
            .collect()
    }

    /// High severity, military and restricted zones.
    pub fn critical(&self) -> Vec<&BoundaryZone> {
        self.zones.iter().filter(|z| z.is_critical()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::geometry::Coordinate;

    fn zone(id: &str, vertices: usize) -> BoundaryZone {
        BoundaryZone {
            id: id.to_string(),
            name: format!("Zone {}", id),
            boundary_type: BoundaryType::Territorial,
            severity: Severity::Low,
            coordinates: (0..vertices)
                .map(|i| Coordinate::new(i as f64 * 0.1, (i % 2) as f64 * 0.1))
                .collect(),
            warning_distance: 1.0,
            description: "test".to_string(),
            consequences: None,
        }
    }

    #[test]
    fn test_builtin_catalog() {
        let registry = BoundaryRegistry::builtin();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.all()[0].id, "india-eez-west");
        assert!(registry.get("kochi-naval-restricted").is_some());
        assert!(registry.get("atlantis").is_none());
    }

    #[test]
    fn test_builtin_catalog_passes_validation() {
        let zones = BoundaryRegistry::builtin().all().to_vec();
        assert!(BoundaryRegistry::new(zones).is_ok());
    }

    #[test]
    fn test_filters() {
        let registry = BoundaryRegistry::builtin();
        assert_eq!(registry.by_type(BoundaryType::Military).len(), 3);
        assert_eq!(registry.by_type(BoundaryType::Restricted).len(), 2);
        assert_eq!(registry.by_type(BoundaryType::Conservation).len(), 2);
        assert_eq!(registry.high_severity().len(), 6);
        assert!(registry
            .high_severity()
            .iter()
            .all(|z| z.severity == Severity::High));
        assert_eq!(registry.critical().len(), 6);
    }

    #[test]
    fn test_rejects_polygon_with_two_vertices() {
        let err = BoundaryRegistry::new(vec![zone("a", 2)]).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidBoundary { ref id, .. } if id == "a"));
    }

    #[test]
    fn test_rejects_closed_polygon_with_two_distinct_vertices() {
        let mut z = zone("a", 2);
        z.coordinates.push(z.coordinates[0]);
        assert!(BoundaryRegistry::new(vec![z]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = BoundaryRegistry::new(vec![zone("a", 3), zone("a", 4)]).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId(ref id) if id == "a"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[{
            "id": "custom",
            "name": "Custom Zone",
            "type": "conservation",
            "severity": "low",
            "coordinates": [
                {"latitude": 1.0, "longitude": 1.0},
                {"latitude": 1.0, "longitude": 2.0},
                {"latitude": 2.0, "longitude": 2.0}
            ],
            "warningDistance": 0.5,
            "description": "Custom"
        }]"#;

        let registry = BoundaryRegistry::from_json(json).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.by_type(BoundaryType::Conservation).len(), 1);
    }

    #[test]
    fn test_from_json_malformed() {
        let err = BoundaryRegistry::from_json("{not json").unwrap_err();
        assert!(matches!(err, RegistryError::Parse(_)));
    }
}
