//! Domain models for SeaGuard.

pub mod alert;
pub mod boundary;
pub mod position;
pub mod session;
pub mod transition;

pub use alert::{AlertType, GeofenceAlert, GeofenceStatus, NearbyBoundary};
pub use boundary::{BoundaryBounds, BoundaryType, BoundaryZone, Severity};
pub use position::PositionSample;
pub use session::MonitoringSession;
pub use transition::{TransitionAlert, TransitionKind};
