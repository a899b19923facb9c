//! Position watcher: previous-sample tracking and event fan-out.

use chrono::{DateTime, Utc};
use domain::models::{GeofenceAlert, PositionSample, TransitionAlert};
use domain::services::{detect_transitions, BoundaryRegistry};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::services::position_source::SourceFailure;

/// Event delivered to subscribers. Per sample the order is `Position`, then
/// `Alerts` (if any), then `Transitions` (if any).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WatchEvent {
    Position(PositionSample),
    Alerts(Vec<GeofenceAlert>),
    Transitions(Vec<TransitionAlert>),
    SourceError(SourceFailure),
}

/// Receiving end of a subscription. Dropping it unsubscribes.
pub type Subscription = mpsc::UnboundedReceiver<WatchEvent>;

#[derive(Debug, Default)]
pub struct PositionWatcher {
    previous: Option<PositionSample>,
    subscribers: Vec<mpsc::UnboundedSender<WatchEvent>>,
}

impl PositionWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn previous(&self) -> Option<&PositionSample> {
        self.previous.as_ref()
    }

    /// Records `sample` as the new previous sample and returns the
    /// transitions relative to the old one. The first sample yields none.
    pub fn observe(
        &mut self,
        registry: &BoundaryRegistry,
        sample: PositionSample,
        now: DateTime<Utc>,
    ) -> Vec<TransitionAlert> {
        let transitions = match &self.previous {
            Some(previous) => detect_transitions(registry, previous, &sample, now),
            None => Vec::new(),
        };
        self.previous = Some(sample);
        transitions
    }

    /// Forgets the previous sample so the next one starts a fresh track.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Sends an event to every live subscriber, pruning closed ones.
    pub fn broadcast(&mut self, event: WatchEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::TransitionKind;

    #[test]
    fn test_first_sample_has_no_transitions() {
        let registry = BoundaryRegistry::builtin();
        let mut watcher = PositionWatcher::new();

        // Inside the Mumbai naval zone from the very first fix
        let transitions = watcher.observe(&registry, PositionSample::now(18.95, 72.85), Utc::now());
        assert!(transitions.is_empty());
        assert!(watcher.previous().is_some());
    }

    #[test]
    fn test_entry_and_exit_across_samples() {
        let registry = BoundaryRegistry::builtin();
        let mut watcher = PositionWatcher::new();
        let now = Utc::now();

        watcher.observe(&registry, PositionSample::now(18.95, 73.5), now);
        let entry = watcher.observe(&registry, PositionSample::now(18.95, 72.85), now);
        assert!(entry
            .iter()
            .any(|t| t.kind == TransitionKind::GeofenceEntry
                && t.boundary_id == "mumbai-naval-restricted"));

        let exit = watcher.observe(&registry, PositionSample::now(18.95, 73.5), now);
        assert!(exit
            .iter()
            .any(|t| t.kind == TransitionKind::GeofenceExit
                && t.boundary_id == "mumbai-naval-restricted"));

        watcher.reset();
        assert!(watcher.previous().is_none());
    }

    #[test]
    fn test_broadcast_prunes_dropped_subscribers() {
        let mut watcher = PositionWatcher::new();
        let mut kept = watcher.subscribe();
        let dropped = watcher.subscribe();
        drop(dropped);

        let sample = PositionSample::now(10.0, 70.0);
        watcher.broadcast(WatchEvent::Position(sample));

        assert_eq!(watcher.subscriber_count(), 1);
        assert_eq!(kept.try_recv().unwrap(), WatchEvent::Position(sample));
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(WatchEvent::Position(PositionSample::now(10.0, 70.0))).unwrap();
        assert_eq!(json["event"], "position");
        assert_eq!(json["data"]["latitude"], 10.0);
    }
}
