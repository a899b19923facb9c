//! Position sources feeding the geofence monitor.
//!
//! A source answers one-shot position requests and can open a continuous
//! watch. Two implementations ship: samples pushed by the device over HTTP,
//! and playback of a recorded JSON track.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use domain::models::PositionSample;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};
use validator::Validate;

// ============================================================================
// Error Types
// ============================================================================

/// Failure reported by a position source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Timed out waiting for a position fix")]
    Timeout,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

impl PositionError {
    /// Metric and API label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::Timeout => "timeout",
            Self::Unavailable(_) => "unavailable",
        }
    }

    /// Whether monitoring must stop. Timeouts are transient.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Timeout)
    }
}

/// Serializable view of a source failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFailure {
    pub kind: &'static str,
    pub message: String,
    pub timestamp: chrono::DateTime<Utc>,
}

impl From<&PositionError> for SourceFailure {
    fn from(err: &PositionError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Source Trait
// ============================================================================

/// Continuous stream of samples or failures. Dropping it ends the watch.
pub type PositionStream = mpsc::Receiver<Result<PositionSample, PositionError>>;

const WATCH_BUFFER: usize = 64;

#[async_trait]
pub trait PositionSource: Send + Sync {
    /// One-shot position request. May wait for a fix; callers bound it with
    /// a timeout.
    async fn current_position(&self) -> Result<PositionSample, PositionError>;

    /// Opens a continuous watch.
    async fn watch(&self) -> Result<PositionStream, PositionError>;

    /// Whether the watch delivers every fix. One-shot requests then only
    /// repeat fixes already seen, so the monitor does not poll.
    fn streams_fixes(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}

fn age_of(sample: &PositionSample) -> Option<Duration> {
    let age_ms = Utc::now().timestamp_millis() - sample.timestamp_millis;
    u64::try_from(age_ms).ok().map(Duration::from_millis)
}

// ============================================================================
// Push Source
// ============================================================================

/// Samples pushed by the device.
///
/// The latest fix answers one-shot requests while it is younger than the
/// maximum age; otherwise the request waits for the next push.
pub struct PushPositionSource {
    maximum_age: Duration,
    latest: Mutex<Option<PositionSample>>,
    watchers: Mutex<Vec<mpsc::Sender<Result<PositionSample, PositionError>>>>,
    notify: Notify,
}

impl PushPositionSource {
    pub fn new(maximum_age: Duration) -> Self {
        Self {
            maximum_age,
            latest: Mutex::new(None),
            watchers: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    /// Accepts a sample from the device and fans it out to open watches.
    ///
    /// Returns the number of watches that received it.
    pub fn push(&self, sample: PositionSample) -> Result<usize, PositionError> {
        sample
            .validate()
            .map_err(|e| PositionError::Unavailable(format!("invalid sample: {}", e)))?;

        *lock(&self.latest) = Some(sample);
        self.notify.notify_waiters();

        let mut watchers = lock(&self.watchers);
        watchers.retain(|tx| match tx.try_send(Ok(sample)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Position watch is lagging; sample dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });

        debug!(
            latitude = sample.latitude,
            longitude = sample.longitude,
            watchers = watchers.len(),
            "Position pushed"
        );
        Ok(watchers.len())
    }

    /// Reports a device-side failure to open watches.
    pub fn push_error(&self, error: PositionError) {
        lock(&self.watchers).retain(|tx| !tx.is_closed() && tx.try_send(Err(error.clone())).is_ok());
    }

    pub fn latest(&self) -> Option<PositionSample> {
        *lock(&self.latest)
    }

    fn fresh_sample(&self) -> Option<PositionSample> {
        self.latest()
            .filter(|sample| age_of(sample).map_or(true, |age| age <= self.maximum_age))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl PositionSource for PushPositionSource {
    async fn current_position(&self) -> Result<PositionSample, PositionError> {
        loop {
            let notified = self.notify.notified();
            if let Some(sample) = self.fresh_sample() {
                return Ok(sample);
            }
            notified.await;
        }
    }

    async fn watch(&self) -> Result<PositionStream, PositionError> {
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        lock(&self.watchers).push(tx);
        Ok(rx)
    }

    fn streams_fixes(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "push"
    }
}

// ============================================================================
// Replay Source
// ============================================================================

/// Plays back a recorded track at a fixed interval.
///
/// Samples are re-stamped with the playback time. One-shot requests return
/// the most recently played sample.
pub struct ReplayPositionSource {
    track: Vec<PositionSample>,
    interval: Duration,
    repeat: bool,
    last_played: std::sync::Arc<Mutex<Option<PositionSample>>>,
}

impl ReplayPositionSource {
    pub fn new(track: Vec<PositionSample>, interval: Duration, repeat: bool) -> Self {
        Self {
            track,
            interval,
            repeat,
            last_played: std::sync::Arc::new(Mutex::new(None)),
        }
    }

    /// Loads a JSON array of samples.
    pub fn from_json(json: &str, interval: Duration, repeat: bool) -> Result<Self, PositionError> {
        let track: Vec<PositionSample> = serde_json::from_str(json)
            .map_err(|e| PositionError::Unavailable(format!("unreadable track: {}", e)))?;
        Ok(Self::new(track, interval, repeat))
    }

    pub async fn from_path(
        path: impl AsRef<Path>,
        interval: Duration,
        repeat: bool,
    ) -> Result<Self, PositionError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            PositionError::Unavailable(format!("cannot read track {}: {}", path.display(), e))
        })?;
        let source = Self::from_json(&json, interval, repeat)?;
        info!(path = %path.display(), samples = source.len(), "Loaded replay track");
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }
}

fn restamp(sample: &PositionSample) -> PositionSample {
    PositionSample {
        timestamp_millis: Utc::now().timestamp_millis(),
        ..*sample
    }
}

#[async_trait]
impl PositionSource for ReplayPositionSource {
    async fn current_position(&self) -> Result<PositionSample, PositionError> {
        if let Some(sample) = *lock(&self.last_played) {
            return Ok(sample);
        }
        self.track
            .first()
            .map(restamp)
            .ok_or_else(|| PositionError::Unavailable("replay track is empty".to_string()))
    }

    async fn watch(&self) -> Result<PositionStream, PositionError> {
        if self.track.is_empty() {
            return Err(PositionError::Unavailable("replay track is empty".to_string()));
        }

        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        let track = self.track.clone();
        let interval = self.interval;
        let repeat = self.repeat;
        let last_played = self.last_played.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut index = 0;

            loop {
                ticker.tick().await;

                let Some(recorded) = track.get(index) else {
                    if repeat {
                        index = 0;
                        continue;
                    }
                    debug!("Replay track finished");
                    break;
                };

                let sample = restamp(recorded);
                *lock(&last_played) = Some(sample);
                if tx.send(Ok(sample)).await.is_err() {
                    debug!("Replay watch closed");
                    break;
                }
                index += 1;
            }
        });

        Ok(rx)
    }

    fn streams_fixes(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}
