//! Request ID propagation and per-request tracing spans.
//!
//! IDs are assigned by `tower_http`'s request-id layers: an incoming
//! `X-Request-ID` header is kept, otherwise a UUID v4 is generated, and the
//! value is echoed on the response.

use axum::{body::Body, http::Request};
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tracing::Span;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Span factory for `TraceLayer`, tagging every log line with the request ID.
pub fn request_span(req: &Request<Body>) -> Span {
    let request_id = request_id(req).unwrap_or("unknown");
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    )
}

/// The request ID assigned to a request, if any.
pub fn request_id<B>(req: &Request<B>) -> Option<&str> {
    req.extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_id_missing() {
        let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        assert_eq!(request_id(&req), None);
    }

    #[test]
    fn test_request_id_present() {
        let mut req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(RequestId::new(HeaderValue::from_static("my-request-id")));
        assert_eq!(request_id(&req), Some("my-request-id"));
    }

    #[test]
    fn test_request_id_header_constant() {
        assert_eq!(REQUEST_ID_HEADER, "x-request-id");
    }
}
