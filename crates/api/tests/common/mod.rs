//! Common test utilities for integration tests.
//!
//! Every test runs against the in-memory store and the push position source,
//! so no external services are needed.

// Allow dead code in this module - helpers are shared across test binaries
// and not every binary uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use persistence::repositories::WriteMode;
use seaguard_api::{
    app::{create_app, AppState},
    config::{
        BoundariesConfig, Config, LoggingConfig, MonitoringConfig, PositionSourceKind,
        SecurityConfig, ServerConfig, StorageBackend, StorageConfig,
    },
};
use std::time::Duration;

/// Test configuration: memory storage, push source, monitoring off.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        monitoring: MonitoringConfig {
            enabled: false,
            source: PositionSourceKind::Push,
            replay_path: String::new(),
            replay_interval_ms: 1000,
            replay_repeat: false,
            poll_interval_secs: 3600,
            position_timeout_ms: 60_000,
            maximum_age_ms: 30_000,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            data_dir: String::new(),
            history_key: "geofence-alert-history".to_string(),
            sessions_key: "geofence-monitoring-sessions".to_string(),
            write_mode: WriteMode::Direct,
        },
        boundaries: BoundariesConfig::default(),
        security: SecurityConfig::default(),
    }
}

/// Build application state from the test configuration.
pub async fn create_test_state() -> AppState {
    AppState::from_config(test_config())
        .await
        .expect("Failed to build test state")
}

/// Create a router over shared state. `oneshot` consumes the router, so build
/// one per request.
pub fn create_test_app(state: &AppState) -> Router {
    create_app(state.clone())
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}

/// Wait until the alert history holds at least `count` alerts.
///
/// Pushed samples are evaluated by the monitoring task, so their effects
/// land shortly after the HTTP response.
pub async fn wait_for_history(state: &AppState, count: usize) -> Vec<domain::models::GeofenceAlert> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let history = state.monitor.alert_history().await;
            if history.len() >= count {
                return history;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Timed out waiting for alert history")
}
