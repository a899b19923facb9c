//! Entry/exit detection between consecutive position samples.

use chrono::{DateTime, Utc};

use crate::models::boundary::BoundaryType;
use crate::models::position::PositionSample;
use crate::models::transition::{TransitionAlert, TransitionKind};
use crate::services::registry::BoundaryRegistry;

/// Compares `previous` and `current` for every boundary in registry order.
///
/// | previous | current | result |
/// |---|---|---|
/// | outside | outside | nothing |
/// | outside | inside | `geofence_entry` |
/// | inside | outside | `geofence_exit` |
/// | inside | inside | `boundary_warning` for restricted zones only |
pub fn detect_transitions(
    registry: &BoundaryRegistry,
    previous: &PositionSample,
    current: &PositionSample,
    now: DateTime<Utc>,
) -> Vec<TransitionAlert> {
    let from = previous.coordinate();
    let to = current.coordinate();

    registry
        .iter()
        .filter_map(|boundary| {
            let was_inside = boundary.contains(from);
            let is_inside = boundary.contains(to);

            let kind = match (was_inside, is_inside) {
                (false, true) => TransitionKind::GeofenceEntry,
                (true, false) => TransitionKind::GeofenceExit,
                (true, true) if boundary.boundary_type == BoundaryType::Restricted => {
                    TransitionKind::BoundaryWarning
                }
                _ => return None,
            };

            Some(TransitionAlert::new(kind, boundary, *current, now))
        })
        .collect()
}

/// Whether the position lies inside any restricted zone.
pub fn is_in_restricted_area(registry: &BoundaryRegistry, position: &PositionSample) -> bool {
    let point = position.coordinate();
    registry
        .by_type(BoundaryType::Restricted)
        .iter()
        .any(|boundary| boundary.contains(point))
}
