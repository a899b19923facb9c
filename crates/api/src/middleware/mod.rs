//! HTTP middleware components.

pub mod logging;
pub mod metrics;
pub mod trace_id;

pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use trace_id::{propagate_request_id_layer, request_span, set_request_id_layer, REQUEST_ID_HEADER};
