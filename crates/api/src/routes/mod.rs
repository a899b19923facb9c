//! HTTP route handlers.

pub mod alerts;
pub mod boundaries;
pub mod geofence;
pub mod health;
pub mod monitoring;
