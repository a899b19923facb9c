//! Alert history repository.
//!
//! In-memory history is authoritative. Every mutation is mirrored to the
//! key-value store either inline or through the background writer; storage
//! failures are logged and counted but never surface to callers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use domain::models::{GeofenceAlert, MonitoringSession};
use domain::services::evaluator::recent_for_boundary;

use crate::entities::alert_history::{
    decode_alerts, decode_ledger, encode_alerts, encode_ledger, DecodeError, SessionLedger,
};
use crate::kv::KeyValueStore;
use crate::metrics::record_persist_failure;
use crate::writer::{apply_write, HistoryWriter, WriteOp};

/// Alerts retained; older ones are dropped first.
pub const MAX_ALERTS: usize = 100;

/// Finished sessions retained in the ledger.
pub const MAX_SESSIONS: usize = 50;

pub const DEFAULT_HISTORY_KEY: &str = "geofence-alert-history";
pub const DEFAULT_SESSIONS_KEY: &str = "geofence-monitoring-sessions";

/// How mutations reach the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Each mutation awaits its write.
    Direct,
    /// Mutations are queued to a [`HistoryWriter`] task.
    #[default]
    Background,
}

/// Storage keys used by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryKeys {
    pub alerts: String,
    pub sessions: String,
}

impl Default for HistoryKeys {
    fn default() -> Self {
        Self {
            alerts: DEFAULT_HISTORY_KEY.to_string(),
            sessions: DEFAULT_SESSIONS_KEY.to_string(),
        }
    }
}

/// Session ledger errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Monitoring session {0} is already active")]
    SessionActive(Uuid),
}

/// Alert history plus the monitoring-session ledger.
pub struct AlertHistoryStore {
    store: Arc<dyn KeyValueStore>,
    keys: HistoryKeys,
    writer: Option<HistoryWriter>,
    alerts: Vec<GeofenceAlert>,
    ledger: SessionLedger,
}

impl AlertHistoryStore {
    /// Loads persisted history, recovering any session left active by an
    /// unclean shutdown.
    pub async fn load(store: Arc<dyn KeyValueStore>, keys: HistoryKeys, mode: WriteMode) -> Self {
        Self::load_at(store, keys, mode, Utc::now()).await
    }

    /// Same as [`AlertHistoryStore::load`] with an explicit recovery instant.
    pub async fn load_at(
        store: Arc<dyn KeyValueStore>,
        keys: HistoryKeys,
        mode: WriteMode,
        now: DateTime<Utc>,
    ) -> Self {
        let alerts = read_or_default(store.as_ref(), &keys.alerts, decode_alerts).await;
        let ledger = read_or_default(store.as_ref(), &keys.sessions, decode_ledger).await;

        info!(
            alerts = alerts.len(),
            sessions = ledger.sessions.len(),
            mode = ?mode,
            "Loaded alert history"
        );

        let writer = match mode {
            WriteMode::Direct => None,
            WriteMode::Background => Some(HistoryWriter::spawn(store.clone())),
        };

        let mut history = Self {
            store,
            keys,
            writer,
            alerts,
            ledger,
        };
        history.recover_session(now).await;
        history
    }

    async fn recover_session(&mut self, now: DateTime<Utc>) {
        let Some(mut session) = self.ledger.current_session.take() else {
            return;
        };

        if session.is_active {
            warn!(
                session_id = %session.id,
                started_at = %session.started_at,
                "Recovering monitoring session interrupted by shutdown"
            );
            session.finish(now);
        }

        self.push_session(session);
        self.persist_ledger().await;
    }

    fn push_session(&mut self, session: MonitoringSession) {
        self.ledger.sessions.push(session);
        let excess = self.ledger.sessions.len().saturating_sub(MAX_SESSIONS);
        self.ledger.sessions.drain(..excess);
    }

    /// Appends alerts, keeping the newest [`MAX_ALERTS`].
    pub async fn append(&mut self, alerts: &[GeofenceAlert]) {
        if alerts.is_empty() {
            return;
        }

        self.alerts.extend_from_slice(alerts);
        let excess = self.alerts.len().saturating_sub(MAX_ALERTS);
        self.alerts.drain(..excess);

        debug!(added = alerts.len(), total = self.alerts.len(), "Appended alerts");

        if let Some(session) = self.ledger.current_session.as_mut() {
            session.alert_count = session
                .alert_count
                .saturating_add(u32::try_from(alerts.len()).unwrap_or(u32::MAX));
            self.persist_ledger().await;
        }
        self.persist_alerts().await;
    }

    /// Insertion-ordered copy of the history.
    pub fn history(&self) -> Vec<GeofenceAlert> {
        self.alerts.clone()
    }

    pub fn alerts(&self) -> &[GeofenceAlert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Alerts for one boundary, newest first.
    pub fn query(&self, boundary_id: &str) -> Vec<GeofenceAlert> {
        recent_for_boundary(&self.alerts, boundary_id, self.alerts.len())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Empties the history and removes its persisted key.
    pub async fn clear(&mut self) {
        let dropped = self.alerts.len();
        self.alerts.clear();
        info!(dropped, "Cleared alert history");
        self.write(self.keys.alerts.clone(), WriteOp::Remove).await;
    }

    /// Opens a new monitoring session.
    pub async fn begin_session(
        &mut self,
        at: DateTime<Utc>,
    ) -> Result<MonitoringSession, HistoryError> {
        if let Some(current) = &self.ledger.current_session {
            return Err(HistoryError::SessionActive(current.id));
        }

        let session = MonitoringSession::start(at);
        info!(session_id = %session.id, "Monitoring session started");
        self.ledger.current_session = Some(session.clone());
        self.persist_ledger().await;
        Ok(session)
    }

    /// Finishes the current session, if any, and moves it to the ledger.
    pub async fn end_session(&mut self, at: DateTime<Utc>) -> Option<MonitoringSession> {
        let mut session = self.ledger.current_session.take()?;
        session.finish(at);
        info!(
            session_id = %session.id,
            alert_count = session.alert_count,
            "Monitoring session ended"
        );

        self.push_session(session.clone());
        self.persist_ledger().await;
        Some(session)
    }

    pub fn current_session(&self) -> Option<&MonitoringSession> {
        self.ledger.current_session.as_ref()
    }

    /// Finished sessions, oldest first.
    pub fn sessions(&self) -> &[MonitoringSession] {
        &self.ledger.sessions
    }

    /// Waits for queued background writes. A no-op in direct mode.
    pub async fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush().await;
        }
    }

    /// Flushes and stops the background writer.
    pub async fn shutdown(&mut self) {
        if let Some(writer) = self.writer.take() {
            writer.shutdown().await;
        }
    }

    async fn persist_alerts(&self) {
        match encode_alerts(&self.alerts) {
            Ok(json) => self.write(self.keys.alerts.clone(), WriteOp::Put(json)).await,
            Err(e) => {
                error!(error = %e, "Failed to serialize alert history");
                record_persist_failure("encode");
            }
        }
    }

    async fn persist_ledger(&self) {
        match encode_ledger(&self.ledger) {
            Ok(json) => self.write(self.keys.sessions.clone(), WriteOp::Put(json)).await,
            Err(e) => {
                error!(error = %e, "Failed to serialize session ledger");
                record_persist_failure("encode");
            }
        }
    }

    async fn write(&self, key: String, op: WriteOp) {
        match &self.writer {
            Some(writer) => writer.submit(&key, op),
            None => {
                apply_write(self.store.as_ref(), &key, &op).await;
            }
        }
    }
}

async fn read_or_default<T: Default>(
    store: &dyn KeyValueStore,
    key: &str,
    decode: fn(&str) -> Result<T, DecodeError>,
) -> T {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            error!(key = %key, error = %e, "Failed to read persisted history");
            return T::default();
        }
    };

    decode(&raw).unwrap_or_else(|e| {
        warn!(key = %key, error = %e, "Discarding unreadable persisted history");
        T::default()
    })
}
