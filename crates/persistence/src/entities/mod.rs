//! Entity definitions for stored data.

pub mod alert_history;

pub use alert_history::{AlertEntity, DecodeError, SessionEntity, SessionLedger};
