//! Health check endpoint handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub boundaries: usize,
    pub monitoring: MonitoringHealth,
}

/// Monitoring loop health.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringHealth {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    /// Kind of the last position source failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<&'static str>,
}

/// Simple status response for liveness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Reports `degraded` when monitoring is enabled in configuration but the
/// loop is not running, e.g. after the position source denied access.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.monitor.status().await;
    let degraded = state.config.monitoring.enabled && !status.is_monitoring;

    Json(HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        boundaries: state.monitor.registry().len(),
        monitoring: MonitoringHealth {
            active: status.is_monitoring,
            source: status.source,
            last_error: status.last_error.map(|e| e.kind),
        },
    })
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}
