use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::BoundaryRegistry;
use persistence::kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use persistence::repositories::{AlertHistoryStore, HistoryKeys};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::{Config, PositionSourceKind, StorageBackend};
use crate::middleware::{
    metrics_handler, metrics_middleware, propagate_request_id_layer, request_span,
    set_request_id_layer,
};
use crate::routes::{alerts, boundaries, geofence, health, monitoring};
use crate::services::{
    GeofenceMonitor, MonitorSettings, PositionSource, PushPositionSource, ReplayPositionSource,
};

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<GeofenceMonitor>,
    /// Source handed to the monitor when monitoring starts
    pub source: Arc<dyn PositionSource>,
    /// Set when the configured source accepts samples over HTTP
    pub push_source: Option<Arc<PushPositionSource>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the registry, storage, history and position source described by
    /// `config`. Monitoring is not started.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let registry = if config.boundaries.path.is_empty() {
            BoundaryRegistry::builtin()
        } else {
            let json = tokio::fs::read_to_string(&config.boundaries.path)
                .await
                .with_context(|| format!("reading boundaries from {}", config.boundaries.path))?;
            BoundaryRegistry::from_json(&json)
                .with_context(|| format!("invalid boundaries in {}", config.boundaries.path))?
        };
        info!(boundaries = registry.len(), "Boundary registry loaded");

        let store: Arc<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::File => Arc::new(
                FileKeyValueStore::open(&config.storage.data_dir)
                    .await
                    .with_context(|| format!("opening data dir {}", config.storage.data_dir))?,
            ),
            StorageBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
        };

        let keys = HistoryKeys {
            alerts: config.storage.history_key.clone(),
            sessions: config.storage.sessions_key.clone(),
        };
        let history = AlertHistoryStore::load(store, keys, config.storage.write_mode).await;
        info!(alerts = history.len(), "Alert history loaded");

        let mut push_source = None;
        let source: Arc<dyn PositionSource> = match config.monitoring.source {
            PositionSourceKind::Push => {
                let push = Arc::new(PushPositionSource::new(config.monitoring.maximum_age()));
                push_source = Some(push.clone());
                push
            }
            PositionSourceKind::Replay => Arc::new(
                ReplayPositionSource::from_path(
                    &config.monitoring.replay_path,
                    config.monitoring.replay_interval(),
                    config.monitoring.replay_repeat,
                )
                .await?,
            ),
        };
        info!(source = source.name(), "Position source ready");

        let monitor = Arc::new(GeofenceMonitor::new(
            Arc::new(registry),
            history,
            MonitorSettings::from(&config.monitoring),
        ));

        Ok(Self {
            monitor,
            source,
            push_source,
            config: Arc::new(config),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        // Boundary registry
        .route("/api/v1/boundaries", get(boundaries::list_boundaries))
        .route("/api/v1/boundaries/:boundary_id", get(boundaries::get_boundary))
        // Evaluation
        .route("/api/v1/geofence/check", post(geofence::check_position))
        // Alert history
        .route(
            "/api/v1/alerts/history",
            get(alerts::get_history).delete(alerts::clear_history),
        )
        // Monitoring control
        .route("/api/v1/monitoring/status", get(monitoring::get_status))
        .route("/api/v1/monitoring/start", post(monitoring::start_monitoring))
        .route("/api/v1/monitoring/stop", post(monitoring::stop_monitoring))
        .route("/api/v1/monitoring/sessions", get(monitoring::list_sessions))
        .route("/api/v1/monitoring/positions", post(monitoring::push_position));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(set_request_id_layer())
        .layer(cors)
        .with_state(state)
}
