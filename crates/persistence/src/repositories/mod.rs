//! Repository implementations.

pub mod alert_history;

pub use alert_history::{AlertHistoryStore, HistoryError, HistoryKeys, WriteMode};
