//! Monitoring control endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use domain::models::{MonitoringSession, PositionSample};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::monitor::{MonitorError, MonitorStatus};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PushPositionRequest {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy: Option<f64>,

    /// Capture time in milliseconds since epoch; defaults to now.
    #[validate(custom(function = "shared::validation::validate_timestamp"))]
    pub timestamp_millis: Option<i64>,
}

impl From<&PushPositionRequest> for PositionSample {
    fn from(request: &PushPositionRequest) -> Self {
        PositionSample {
            latitude: request.latitude,
            longitude: request.longitude,
            accuracy: request.accuracy,
            timestamp_millis: request
                .timestamp_millis
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPositionResponse {
    pub accepted: bool,
    pub watchers: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsResponse {
    pub sessions: Vec<MonitoringSession>,
    pub total: usize,
}

/// Current monitoring state.
///
/// GET /api/v1/monitoring/status
pub async fn get_status(State(state): State<AppState>) -> Json<MonitorStatus> {
    Json(state.monitor.status().await)
}

/// Start monitoring with the configured position source.
///
/// POST /api/v1/monitoring/start
pub async fn start_monitoring(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<MonitoringSession>), ApiError> {
    let session = state.monitor.start_monitoring(state.source.clone()).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Stop monitoring.
///
/// POST /api/v1/monitoring/stop
pub async fn stop_monitoring(
    State(state): State<AppState>,
) -> Result<Json<MonitoringSession>, ApiError> {
    state
        .monitor
        .stop_monitoring()
        .await
        .map(Json)
        .ok_or_else(|| MonitorError::NotMonitoring.into())
}

/// Finished and active monitoring sessions, oldest first.
///
/// GET /api/v1/monitoring/sessions
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionsResponse> {
    let sessions = state.monitor.sessions().await;
    let total = sessions.len();
    Json(SessionsResponse { sessions, total })
}

/// Push a position sample from the device.
///
/// POST /api/v1/monitoring/positions
///
/// The sample is handed to the push source and evaluated asynchronously by
/// the monitoring loop; results appear in the alert history.
pub async fn push_position(
    State(state): State<AppState>,
    Json(request): Json<PushPositionRequest>,
) -> Result<(StatusCode, Json<PushPositionResponse>), ApiError> {
    request.validate()?;

    let push_source = state.push_source.as_ref().ok_or_else(|| {
        ApiError::Conflict("The configured position source does not accept pushed samples".into())
    })?;
    if !state.monitor.is_monitoring() {
        return Err(MonitorError::NotMonitoring.into());
    }

    let watchers = push_source
        .push(PositionSample::from(&request))
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    info!(
        latitude = request.latitude,
        longitude = request.longitude,
        watchers,
        "Position sample accepted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(PushPositionResponse {
            accepted: true,
            watchers,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_request_defaults_timestamp() {
        let request: PushPositionRequest =
            serde_json::from_str(r#"{"latitude": 9.5, "longitude": 76.0}"#).unwrap();
        assert!(request.validate().is_ok());

        let sample = PositionSample::from(&request);
        assert_eq!(sample.latitude, 9.5);
        assert!(sample.accuracy.is_none());
        assert!(sample.timestamp_millis > 0);
    }

    #[test]
    fn test_push_request_rejects_negative_accuracy() {
        let request: PushPositionRequest =
            serde_json::from_str(r#"{"latitude": 9.5, "longitude": 76.0, "accuracy": -1.0}"#)
                .unwrap();
        assert!(request.validate().is_err());
    }
}
