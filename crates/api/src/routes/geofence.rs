//! Geofence check endpoint handlers.

use axum::{extract::State, Json};
use domain::models::{GeofenceAlert, GeofenceStatus};
use domain::services::top_alert;
use serde::{Deserialize, Serialize};
use shared::format::format_distance;
use shared::geometry::Coordinate;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceCheckRequest {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDistance {
    pub boundary_id: String,
    pub distance_formatted: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceCheckResponse {
    #[serde(flatten)]
    pub status: GeofenceStatus,
    pub nearby_distances: Vec<NearbyDistance>,
    /// The alert a display should surface first.
    pub top_alert: Option<GeofenceAlert>,
}

impl From<GeofenceStatus> for GeofenceCheckResponse {
    fn from(status: GeofenceStatus) -> Self {
        let nearby_distances = status
            .nearby_boundaries
            .iter()
            .map(|nearby| NearbyDistance {
                boundary_id: nearby.boundary.id.clone(),
                distance_formatted: format_distance(nearby.distance),
            })
            .collect();
        let top_alert = top_alert(&status.active_alerts).cloned();

        Self {
            status,
            nearby_distances,
            top_alert,
        }
    }
}

/// Evaluate a position against every boundary without recording alerts.
///
/// POST /api/v1/geofence/check
pub async fn check_position(
    State(state): State<AppState>,
    Json(request): Json<GeofenceCheckRequest>,
) -> Result<Json<GeofenceCheckResponse>, ApiError> {
    request.validate()?;

    let position = Coordinate::new(request.latitude, request.longitude);
    let status = state.monitor.check_geofence_status(position).await;

    tracing::debug!(
        latitude = request.latitude,
        longitude = request.longitude,
        inside = status.is_inside_boundary,
        alerts = status.active_alerts.len(),
        "Geofence check"
    );

    Ok(Json(GeofenceCheckResponse::from(status)))
}
