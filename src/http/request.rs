//! Request identification and timing.
//!
//! # Responsibilities
//! - Read the request ID assigned by `SetRequestIdLayer`
//! - Log method, path, status and latency of every completed request
//! - Feed request counters and latency histogram

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID from headers, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Logs every request once it has been answered, including rejected ones.
pub async fn request_timing(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    metrics::record_request(method.as_str(), status, start);
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = %query,
        status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
