//! Boundary registry endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{BoundaryBounds, BoundaryType, BoundaryZone, Severity};
use serde::{Deserialize, Serialize};
use shared::format::format_distance;
use shared::geometry::Coordinate;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBoundariesQuery {
    #[serde(rename = "type")]
    pub boundary_type: Option<String>,
    pub severity: Option<String>,
    #[serde(default)]
    pub critical: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryResponse {
    #[serde(flatten)]
    pub zone: BoundaryZone,
    pub is_critical: bool,
    pub warning_distance_formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundaryBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid: Option<Coordinate>,
}

impl From<&BoundaryZone> for BoundaryResponse {
    fn from(zone: &BoundaryZone) -> Self {
        Self {
            zone: zone.clone(),
            is_critical: zone.is_critical(),
            warning_distance_formatted: format_distance(zone.warning_distance),
            bounds: zone.bounds(),
            centroid: zone.centroid(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBoundariesResponse {
    pub boundaries: Vec<BoundaryResponse>,
    pub total: usize,
}

/// List boundaries, optionally filtered.
///
/// GET /api/v1/boundaries?type=<type>&severity=<severity>&critical=true
pub async fn list_boundaries(
    State(state): State<AppState>,
    Query(query): Query<ListBoundariesQuery>,
) -> Result<Json<ListBoundariesResponse>, ApiError> {
    let boundary_type = query
        .boundary_type
        .as_deref()
        .map(|s| {
            BoundaryType::parse(s)
                .ok_or_else(|| ApiError::Validation(format!("Unknown boundary type: {}", s)))
        })
        .transpose()?;
    let severity = query
        .severity
        .as_deref()
        .map(|s| {
            Severity::parse(s)
                .ok_or_else(|| ApiError::Validation(format!("Unknown severity: {}", s)))
        })
        .transpose()?;

    let registry = state.monitor.registry();
    let mut zones: Vec<&BoundaryZone> = match boundary_type {
        Some(t) => registry.by_type(t),
        None => registry.iter().collect(),
    };
    if let Some(severity) = severity {
        zones.retain(|z| z.severity == severity);
    }
    if query.critical {
        zones.retain(|z| z.is_critical());
    }

    let boundaries: Vec<BoundaryResponse> = zones.into_iter().map(BoundaryResponse::from).collect();
    let total = boundaries.len();

    Ok(Json(ListBoundariesResponse { boundaries, total }))
}

/// Get a single boundary.
///
/// GET /api/v1/boundaries/:boundary_id
pub async fn get_boundary(
    State(state): State<AppState>,
    Path(boundary_id): Path<String>,
) -> Result<Json<BoundaryResponse>, ApiError> {
    state
        .monitor
        .registry()
        .get(&boundary_id)
        .map(|zone| Json(BoundaryResponse::from(zone)))
        .ok_or_else(|| ApiError::NotFound(format!("Boundary not found: {}", boundary_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::BoundaryRegistry;

    #[test]
    fn test_boundary_response_serialization() {
        let registry = BoundaryRegistry::builtin();
        let zone = registry.get("mumbai-naval-restricted").unwrap();
        let json = serde_json::to_value(BoundaryResponse::from(zone)).unwrap();

        assert_eq!(json["id"], "mumbai-naval-restricted");
        assert_eq!(json["type"], "military");
        assert_eq!(json["isCritical"], true);
        assert!(json["bounds"]["minLatitude"].is_number());
        assert!(json["warningDistanceFormatted"].as_str().unwrap().ends_with("km"));
    }

    #[test]
    fn test_query_defaults() {
        let query: ListBoundariesQuery = serde_json::from_str("{}").unwrap();
        assert!(query.boundary_type.is_none());
        assert!(!query.critical);
    }
}
