//! Monitoring session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One start/stop span of boundary monitoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Alerts recorded while the session was active.
    #[serde(default)]
    pub alert_count: u32,
}

impl MonitoringSession {
    pub fn start(at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: at,
            ended_at: None,
            is_active: true,
            alert_count: 0,
        }
    }

    /// Closes the session. Closing twice keeps the first end time.
    pub fn finish(&mut self, at: DateTime<Utc>) {
        if self.is_active {
            self.ended_at = Some(at);
            self.is_active = false;
        }
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_and_finish() {
        let start = Utc::now();
        let mut session = MonitoringSession::start(start);
        assert!(session.is_active);
        assert!(session.duration().is_none());

        let end = start + chrono::Duration::minutes(42);
        session.finish(end);
        assert!(!session.is_active);
        assert_eq!(session.ended_at, Some(end));
        assert_eq!(session.duration(), Some(chrono::Duration::minutes(42)));

        session.finish(end + chrono::Duration::minutes(5));
        assert_eq!(session.ended_at, Some(end));
    }
}
