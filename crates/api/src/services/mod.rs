//! Monitoring services: position sources, the watcher and the monitor.

pub mod monitor;
pub mod position_source;
pub mod watcher;

pub use monitor::{GeofenceMonitor, MonitorError, MonitorSettings, MonitorStatus, SampleOutcome};
pub use position_source::{
    PositionError, PositionSource, PushPositionSource, ReplayPositionSource, SourceFailure,
};
pub use watcher::{PositionWatcher, Subscription, WatchEvent};
