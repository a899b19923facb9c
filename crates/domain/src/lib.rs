//! Domain layer for SeaGuard.
//!
//! This crate contains:
//! - Domain models (BoundaryZone, GeofenceAlert, PositionSample, MonitoringSession)
//! - The boundary registry and its built-in catalog
//! - Geofence evaluation, transition detection and alert prioritization

pub mod models;
pub mod services;
