//! Ordering and de-duplication of alerts for presentation.

use std::collections::HashSet;

use crate::models::alert::GeofenceAlert;

fn priority(alert: &GeofenceAlert) -> u8 {
    alert.alert_type.priority() * 10 + alert.severity.priority()
}

/// Sorts alerts most urgent first: alert type outranks severity, and equal
/// priorities put the newest first.
pub fn prioritize_alerts(alerts: &mut [GeofenceAlert]) {
    alerts.sort_by(|a, b| {
        priority(b)
            .cmp(&priority(a))
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
}

/// The single most urgent alert, if any.
pub fn top_alert(alerts: &[GeofenceAlert]) -> Option<&GeofenceAlert> {
    alerts.iter().max_by(|a, b| {
        priority(a)
            .cmp(&priority(b))
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    })
}

/// Drops alerts whose id was already seen, keeping the first occurrence.
pub fn dedup_by_id(alerts: Vec<GeofenceAlert>) -> Vec<GeofenceAlert> {
    let mut seen = HashSet::new();
    alerts
        .into_iter()
        .filter(|alert| seen.insert(alert.id.clone()))
        .collect()
}
