//! Domain services for SeaGuard.
//!
//! Services contain the geofencing logic that operates on domain models.

pub mod builtin_boundaries;
pub mod evaluator;
pub mod prioritization;
pub mod registry;
pub mod transitions;

pub use evaluator::{check_geofence_status, check_geofence_status_at, is_approaching};
pub use prioritization::{dedup_by_id, prioritize_alerts, top_alert};
pub use registry::{BoundaryRegistry, RegistryError};
pub use transitions::{detect_transitions, is_in_restricted_area};
