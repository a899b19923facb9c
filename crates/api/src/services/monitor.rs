//! Geofence monitoring service.
//!
//! [`GeofenceMonitor`] owns the boundary registry, the alert history and the
//! position watcher. Samples arrive from the source's watch stream, from
//! samples submitted directly, and from a fixed-interval poll for sources
//! whose watch does not stream every fix. All of them are processed under
//! one mutex, so a sample's events reach subscribers before the next sample
//! is evaluated.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use domain::models::{
    GeofenceAlert, GeofenceStatus, MonitoringSession, PositionSample, TransitionAlert,
    TransitionKind,
};
use domain::services::{check_geofence_status_at, is_in_restricted_area, BoundaryRegistry};
use persistence::repositories::{AlertHistoryStore, HistoryError};
use serde::Serialize;
use shared::geometry::Coordinate;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::MonitoringConfig;
use crate::middleware::metrics::{
    record_alerts_emitted, record_sample_processed, record_source_error, record_transition,
};
use crate::services::position_source::{
    PositionError, PositionSource, PositionStream, SourceFailure,
};
use crate::services::watcher::{PositionWatcher, Subscription, WatchEvent};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Geofence monitoring is already active")]
    AlreadyMonitoring,

    #[error("Geofence monitoring is not active")]
    NotMonitoring,

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Session(#[from] HistoryError),
}

/// Timing knobs for the monitoring loop.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub position_timeout: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            position_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&MonitoringConfig> for MonitorSettings {
    fn from(config: &MonitoringConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            position_timeout: config.position_timeout(),
        }
    }
}

/// Result of evaluating one sample.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleOutcome {
    pub status: GeofenceStatus,
    /// Evaluator alerts plus restricted-area warnings, as appended to history
    pub alerts: Vec<GeofenceAlert>,
    pub transitions: Vec<TransitionAlert>,
}

/// Snapshot for the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub is_monitoring: bool,
    pub source: Option<&'static str>,
    pub session: Option<MonitoringSession>,
    pub last_position: Option<PositionSample>,
    /// Whether the last position lies inside a restricted zone
    pub in_restricted_area: bool,
    pub last_error: Option<SourceFailure>,
    pub samples_processed: u64,
    pub alert_history_size: usize,
    pub subscribers: usize,
    pub poll_interval_secs: u64,
}

struct RunHandle {
    cancel: CancellationToken,
    source: &'static str,
}

struct MonitorState {
    history: AlertHistoryStore,
    watcher: PositionWatcher,
    run: Option<RunHandle>,
    last_position: Option<PositionSample>,
    last_error: Option<SourceFailure>,
    samples_processed: u64,
}

impl MonitorState {
    /// A polled fix at or before the last processed one was already seen.
    fn already_processed(&self, sample: &PositionSample) -> bool {
        self.last_position
            .map_or(false, |last| sample.timestamp_millis <= last.timestamp_millis)
    }

    async fn process(
        &mut self,
        registry: &BoundaryRegistry,
        sample: PositionSample,
        now: DateTime<Utc>,
    ) -> SampleOutcome {
        let position = sample.coordinate();
        let status = check_geofence_status_at(registry, position, self.history.alerts(), now);
        let transitions = self.watcher.observe(registry, sample, now);

        let mut alerts = status.active_alerts.clone();
        alerts.extend(
            transitions
                .iter()
                .filter(|t| t.kind == TransitionKind::BoundaryWarning)
                .filter_map(|t| registry.get(&t.boundary_id))
                .map(|boundary| GeofenceAlert::warning(boundary, position, now)),
        );

        self.history.append(&alerts).await;

        record_sample_processed();
        record_alerts_emitted(&alerts);
        for transition in &transitions {
            record_transition(transition.kind);
        }

        self.watcher.broadcast(WatchEvent::Position(sample));
        if !alerts.is_empty() {
            self.watcher.broadcast(WatchEvent::Alerts(alerts.clone()));
        }
        if !transitions.is_empty() {
            self.watcher
                .broadcast(WatchEvent::Transitions(transitions.clone()));
        }

        self.last_position = Some(sample);
        self.samples_processed += 1;

        debug!(
            latitude = sample.latitude,
            longitude = sample.longitude,
            alerts = alerts.len(),
            transitions = transitions.len(),
            inside = status.is_inside_boundary,
            "Processed position sample"
        );

        SampleOutcome {
            status,
            alerts,
            transitions,
        }
    }
}

const POLL_TRIGGER: &str = "poll";

pub struct GeofenceMonitor {
    registry: Arc<BoundaryRegistry>,
    settings: MonitorSettings,
    active: AtomicBool,
    state: Mutex<MonitorState>,
}

impl GeofenceMonitor {
    pub fn new(
        registry: Arc<BoundaryRegistry>,
        history: AlertHistoryStore,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            registry,
            settings,
            active: AtomicBool::new(false),
            state: Mutex::new(MonitorState {
                history,
                watcher: PositionWatcher::new(),
                run: None,
                last_position: None,
                last_error: None,
                samples_processed: 0,
            }),
        }
    }

    pub fn registry(&self) -> &BoundaryRegistry {
        &self.registry
    }

    pub fn is_monitoring(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Opens an event subscription. Dropping the receiver unsubscribes.
    pub async fn subscribe(&self) -> Subscription {
        self.state.lock().await.watcher.subscribe()
    }

    /// Evaluates a position against the registry and current history without
    /// recording anything.
    pub async fn check_geofence_status(&self, position: Coordinate) -> GeofenceStatus {
        let state = self.state.lock().await;
        check_geofence_status_at(&self.registry, position, state.history.alerts(), Utc::now())
    }

    pub async fn alert_history(&self) -> Vec<GeofenceAlert> {
        self.state.lock().await.history.history()
    }

    /// Alerts for one boundary, newest first.
    pub async fn alert_history_for(&self, boundary_id: &str) -> Vec<GeofenceAlert> {
        self.state.lock().await.history.query(boundary_id)
    }

    pub async fn clear_alert_history(&self) {
        self.state.lock().await.history.clear().await;
    }

    pub async fn sessions(&self) -> Vec<MonitoringSession> {
        self.state.lock().await.history.sessions().to_vec()
    }

    pub async fn status(&self) -> MonitorStatus {
        let state = self.state.lock().await;
        MonitorStatus {
            is_monitoring: self.is_monitoring(),
            source: state.run.as_ref().map(|run| run.source),
            session: state.history.current_session().cloned(),
            last_position: state.last_position,
            in_restricted_area: state
                .last_position
                .map_or(false, |p| is_in_restricted_area(&self.registry, &p)),
            last_error: state.last_error.clone(),
            samples_processed: state.samples_processed,
            alert_history_size: state.history.len(),
            subscribers: state.watcher.subscriber_count(),
            poll_interval_secs: self.settings.poll_interval.as_secs(),
        }
    }

    /// Starts watching `source`, and polling it at the configured interval
    /// unless its watch streams every fix.
    ///
    /// The first poll fires immediately. Fails if monitoring is already
    /// active or the source refuses to open a watch.
    pub async fn start_monitoring(
        self: &Arc<Self>,
        source: Arc<dyn PositionSource>,
    ) -> Result<MonitoringSession, MonitorError> {
        let mut state = self.state.lock().await;
        if self.is_monitoring() {
            return Err(MonitorError::AlreadyMonitoring);
        }

        let stream = match source.watch().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(source = source.name(), error = %e, "Position source refused watch");
                record_source_error(e.kind());
                state.last_error = Some(SourceFailure::from(&e));
                return Err(e.into());
            }
        };

        let session = state.history.begin_session(Utc::now()).await?;
        let cancel = CancellationToken::new();

        state.watcher.reset();
        state.last_error = None;
        state.run = Some(RunHandle {
            cancel: cancel.clone(),
            source: source.name(),
        });
        self.active.store(true, Ordering::SeqCst);

        let polling = !source.streams_fixes();
        tokio::spawn(watch_loop(Arc::downgrade(self), stream, cancel.clone()));
        if polling {
            tokio::spawn(poll_loop(
                Arc::downgrade(self),
                source.clone(),
                self.settings.clone(),
                cancel,
            ));
        }

        info!(
            session_id = %session.id,
            source = source.name(),
            polling,
            poll_interval_secs = self.settings.poll_interval.as_secs(),
            "Geofence monitoring started"
        );
        Ok(session)
    }

    /// Stops monitoring and closes the current session.
    ///
    /// Returns the finished session, or `None` if monitoring was not active.
    pub async fn stop_monitoring(&self) -> Option<MonitoringSession> {
        // Cleared before waiting on the lock so queued samples are dropped
        let was_active = self.active.swap(false, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        self.active.store(false, Ordering::SeqCst);
        let session = Self::teardown(&mut state).await;

        if was_active {
            info!(
                session_id = ?session.as_ref().map(|s| s.id),
                "Geofence monitoring stopped"
            );
        }
        session
    }

    /// Processes a sample delivered outside the monitoring loop.
    pub async fn submit_sample(
        &self,
        sample: PositionSample,
    ) -> Result<SampleOutcome, MonitorError> {
        let mut state = self.active_state("submitted").await?;
        Ok(state.process(&self.registry, sample, Utc::now()).await)
    }

    /// Stops monitoring and flushes pending history writes.
    pub async fn shutdown(&self) {
        self.stop_monitoring().await;
        self.state.lock().await.history.shutdown().await;
        info!("Geofence monitor shut down");
    }

    async fn teardown(state: &mut MonitorState) -> Option<MonitoringSession> {
        if let Some(run) = state.run.take() {
            run.cancel.cancel();
        }
        state.watcher.reset();
        state.history.end_session(Utc::now()).await
    }

    async fn active_state(
        &self,
        trigger: &'static str,
    ) -> Result<MutexGuard<'_, MonitorState>, MonitorError> {
        let state = self.state.lock().await;
        if !self.is_monitoring() {
            debug!(trigger, "Monitoring inactive; sample ignored");
            return Err(MonitorError::NotMonitoring);
        }
        Ok(state)
    }

    async fn handle_source_result(
        &self,
        result: Result<PositionSample, PositionError>,
        trigger: &'static str,
    ) -> ControlFlow<()> {
        match result {
            Ok(sample) => {
                if let Err(e) = sample.validate() {
                    warn!(trigger, error = %e, "Discarding invalid position sample");
                    record_source_error("invalid_sample");
                    return ControlFlow::Continue(());
                }
                let Ok(mut state) = self.active_state(trigger).await else {
                    return ControlFlow::Break(());
                };
                if trigger == POLL_TRIGGER && state.already_processed(&sample) {
                    debug!(trigger, "Fix already processed; skipped");
                    return ControlFlow::Continue(());
                }
                state.process(&self.registry, sample, Utc::now()).await;
                ControlFlow::Continue(())
            }
            Err(error) => self.handle_source_error(error, trigger).await,
        }
    }

    async fn handle_source_error(
        &self,
        error: PositionError,
        trigger: &'static str,
    ) -> ControlFlow<()> {
        record_source_error(error.kind());

        let mut state = self.state.lock().await;
        if !self.is_monitoring() {
            return ControlFlow::Break(());
        }

        let failure = SourceFailure::from(&error);
        state.last_error = Some(failure.clone());
        state.watcher.broadcast(WatchEvent::SourceError(failure));

        if error.is_fatal() {
            warn!(trigger, error = %error, "Position source failed; stopping monitoring");
            self.active.store(false, Ordering::SeqCst);
            Self::teardown(&mut state).await;
            ControlFlow::Break(())
        } else {
            warn!(trigger, error = %error, "Position request failed; will retry on next trigger");
            ControlFlow::Continue(())
        }
    }
}

async fn watch_loop(
    monitor: Weak<GeofenceMonitor>,
    mut stream: PositionStream,
    cancel: CancellationToken,
) {
    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = stream.recv() => match item {
                Some(result) => result,
                None => {
                    debug!("Position watch closed");
                    break;
                }
            },
        };

        let Some(monitor) = monitor.upgrade() else {
            break;
        };
        if monitor.handle_source_result(result, "watch").await.is_break() {
            break;
        }
    }
    debug!("Watch loop stopped");
}

async fn poll_loop(
    monitor: Weak<GeofenceMonitor>,
    source: Arc<dyn PositionSource>,
    settings: MonitorSettings,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(settings.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            fix = tokio::time::timeout(settings.position_timeout, source.current_position()) => {
                fix.unwrap_or(Err(PositionError::Timeout))
            }
        };

        let Some(monitor) = monitor.upgrade() else {
            break;
        };
        if monitor.handle_source_result(result, POLL_TRIGGER).await.is_break() {
            break;
        }
    }
    debug!("Poll loop stopped");
}
