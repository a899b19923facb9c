//! Alert history endpoint handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use domain::models::GeofenceAlert;
use domain::services::{dedup_by_id, prioritize_alerts};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertHistoryQuery {
    pub boundary_id: Option<String>,
    /// Order by priority instead of insertion order, dropping repeated ids.
    #[serde(default)]
    pub prioritized: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertHistoryResponse {
    pub alerts: Vec<GeofenceAlert>,
    pub total: usize,
}

/// Get the persisted alert history.
///
/// GET /api/v1/alerts/history?boundaryId=<id>&prioritized=true
///
/// Unfiltered history is oldest first; a boundary filter returns newest first.
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<AlertHistoryQuery>,
) -> Result<Json<AlertHistoryResponse>, ApiError> {
    let mut alerts = match query.boundary_id.as_deref() {
        Some(boundary_id) => {
            if state.monitor.registry().get(boundary_id).is_none() {
                return Err(ApiError::NotFound(format!(
                    "Boundary not found: {}",
                    boundary_id
                )));
            }
            state.monitor.alert_history_for(boundary_id).await
        }
        None => state.monitor.alert_history().await,
    };

    if query.prioritized {
        alerts = dedup_by_id(alerts);
        prioritize_alerts(&mut alerts);
    }

    let total = alerts.len();
    Ok(Json(AlertHistoryResponse { alerts, total }))
}

/// Clear the alert history.
///
/// DELETE /api/v1/alerts/history
pub async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.monitor.clear_alert_history().await;
    info!("Alert history cleared");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing() {
        let query: AlertHistoryQuery =
            serde_json::from_str(r#"{"boundaryId": "srilanka-boundary", "prioritized": true}"#)
                .unwrap();
        assert_eq!(query.boundary_id.as_deref(), Some("srilanka-boundary"));
        assert!(query.prioritized);
    }
}
