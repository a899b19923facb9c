//! Alert history persistence metrics.
//!
//! Provides functions for recording storage-related metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record how long a history write took.
pub fn record_persist_duration(operation: &str, duration_secs: f64) {
    histogram!(
        "alert_history_persist_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Count a failed history write.
pub fn record_persist_failure(operation: &str) {
    counter!(
        "alert_history_persist_failures_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// A helper to time history writes and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = PersistTimer::new("set");
/// let result = store.set(key, &json).await;
/// timer.record();
/// result
/// ```
pub struct PersistTimer {
    operation: String,
    start: Instant,
}

impl PersistTimer {
    /// Create a new timer for the given storage operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_persist_duration(&self.operation, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_timer_creation() {
        let timer = PersistTimer::new("set");
        assert_eq!(timer.operation, "set");
        timer.record();
    }
}
