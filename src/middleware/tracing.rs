// ABOUTME: Request tracing helpers for correlation and structured logging
// ABOUTME: Builds the per-request span carrying the request ID and authenticated user

use axum::extract::Request;
use tracing::Span;

/// Header carrying the correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the span for one HTTP request
///
/// The request ID is assigned by `SetRequestIdLayer` before this runs; `user_id` is
/// filled in by the auth middleware once the token is validated.
pub fn create_request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        user_id = tracing::field::Empty,
    )
}
