//! Geofence evaluation of a single position against the registry.
//!
//! Evaluation is pure: the caller supplies the alert history used for trend
//! detection and owns whatever it does with the resulting alerts.

use chrono::{DateTime, Utc};
use shared::geometry::Coordinate;

use crate::models::alert::{GeofenceAlert, GeofenceStatus, NearbyBoundary};
use crate::models::boundary::BoundaryZone;
use crate::services::registry::BoundaryRegistry;

/// Evaluates `position` against every boundary, stamping alerts with the
/// current time.
pub fn check_geofence_status(
    registry: &BoundaryRegistry,
    position: Coordinate,
    history: &[GeofenceAlert],
) -> GeofenceStatus {
    check_geofence_status_at(registry, position, history, Utc::now())
}

/// Same as [`check_geofence_status`] with an explicit evaluation instant.
pub fn check_geofence_status_at(
    registry: &BoundaryRegistry,
    position: Coordinate,
    history: &[GeofenceAlert],
    now: DateTime<Utc>,
) -> GeofenceStatus {
    let mut status = GeofenceStatus::default();

    for boundary in registry.iter() {
        let distance = boundary.distance_from(position);

        if distance == 0.0 {
            status.is_inside_boundary = true;
            status
                .active_alerts
                .push(GeofenceAlert::violation(boundary, position, now));
        } else if distance <= boundary.warning_distance {
            let is_approaching = is_approaching(boundary, distance, history);

            status.nearby_boundaries.push(NearbyBoundary {
                boundary: boundary.clone(),
                distance,
                is_approaching,
            });
            status
                .active_alerts
                .push(GeofenceAlert::approaching(boundary, position, distance, now));
        }
    }

    status
}

/// Trend heuristic with a two-sample lag.
///
/// Takes the two most recent alerts for the boundary and compares the current
/// distance against the older of the two, which damps single jittery fixes.
/// Fewer than two prior alerts means there is not enough signal yet.
pub fn is_approaching(
    boundary: &BoundaryZone,
    current_distance: f64,
    history: &[GeofenceAlert],
) -> bool {
    let recent = recent_for_boundary(history, &boundary.id, 2);
    if recent.len() < 2 {
        return false;
    }

    current_distance < recent[1].distance
}

/// Up to `limit` alerts for a boundary, newest first.
///
/// Alerts sharing a timestamp keep the later insertion first.
pub fn recent_for_boundary<'a>(
    history: &'a [GeofenceAlert],
    boundary_id: &str,
    limit: usize,
) -> Vec<&'a GeofenceAlert> {
    let mut matching: Vec<&GeofenceAlert> = history
        .iter()
        .rev()
        .filter(|a| a.boundary_id == boundary_id)
        .collect();
    matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matching.truncate(limit);
    matching
}
