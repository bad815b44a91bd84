//! Response bodies shared by middleware and handlers.

use std::any::Any;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// `{"message": ...}` error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 429 response for a request the admission controller turned away.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RateLimitRejection {
    pub message: String,
    /// Seconds until the partition's window resets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<f64>,
    #[serde(skip)]
    wait: Option<Duration>,
}

impl RateLimitRejection {
    pub fn new(retry_after: Option<Duration>) -> Self {
        match retry_after {
            Some(wait) => Self {
                message: format!(
                    "Too many requests. Please try again in {:.1} seconds.",
                    wait.as_secs_f64()
                ),
                retry_after: Some(wait.as_secs_f64()),
                wait: Some(wait),
            },
            None => Self {
                message: "Too many requests. Please try again later.".to_string(),
                retry_after: None,
                wait: None,
            },
        }
    }
}

/// Whole seconds for the `Retry-After` header, rounded up.
pub fn retry_after_header_secs(wait: Duration) -> u64 {
    wait.as_secs() + u64::from(wait.subsec_nanos() > 0)
}

impl IntoResponse for RateLimitRejection {
    fn into_response(self) -> Response {
        let retry_secs = self.wait.map(retry_after_header_secs);

        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(self)).into_response();
        if let Some(secs) = retry_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// RFC 7807 body used when a handler panics.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    pub status: u16,
    pub title: String,
    pub detail: String,
}

impl ProblemDetails {
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            title: "Server Error".to_string(),
            detail: "An error occurred while processing the request. Please try again later."
                .to_string(),
        }
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Panic handler for `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Unhandled panic while processing request");
    ProblemDetails::internal().into_response()
}
