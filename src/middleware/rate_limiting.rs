// ABOUTME: Rate limiting middleware for HTTP requests
// ABOUTME: Counts every request per client address and answers 429 with standard headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Rate Limiting Middleware with HTTP Headers
//!
//! Runs ahead of routing so every request counts, authenticated or not. Allowed
//! responses carry the limit headers too, so clients can pace themselves.
//!
//! Clients are keyed by socket address. `x-forwarded-for` is only read when the
//! socket peer is one of the configured trusted proxies.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use fitcoach_core::errors::AppError;
use http::{HeaderMap, HeaderValue};

use crate::logging::AppLogger;
use crate::rate_limiting::RateLimitStatus;
use crate::resources::ServerResources;

/// HTTP header names for rate limiting
pub mod headers {
    /// HTTP header name for maximum requests allowed in the current window
    pub const X_RATE_LIMIT_LIMIT: &str = "X-RateLimit-Limit";
    /// HTTP header name for remaining requests in the current window
    pub const X_RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";
    /// HTTP header name for Unix timestamp when rate limit resets
    pub const X_RATE_LIMIT_RESET: &str = "X-RateLimit-Reset";
    /// HTTP header name for retry-after duration in seconds
    pub const RETRY_AFTER: &str = "Retry-After";
    /// Proxy-supplied client address chain
    pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
}

/// Client key for a request
///
/// The socket peer's IP, unless that peer is a trusted proxy. Behind trusted
/// proxies the chain is walked from the nearest hop and the first address that is
/// not a trusted proxy wins; an unparseable hop ends the walk at the peer.
#[must_use]
pub fn client_key(
    peer: Option<IpAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[IpAddr],
) -> String {
    let Some(peer) = peer else {
        return "unknown".to_owned();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let hops: Vec<&str> = headers
        .get_all(headers::X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|chain| chain.split(','))
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .collect();

    for hop in hops.iter().rev() {
        match hop.parse::<IpAddr>() {
            Ok(ip) if trusted_proxies.contains(&ip) => {}
            Ok(ip) => return ip.to_string(),
            Err(_) => break,
        }
    }
    peer.to_string()
}

/// Write the limit headers for `status`
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    let reset_at = chrono::Utc::now().timestamp()
        + i64::try_from(status.reset_after_secs).unwrap_or(i64::MAX / 2);

    headers.insert(headers::X_RATE_LIMIT_LIMIT, HeaderValue::from(status.limit));
    headers.insert(
        headers::X_RATE_LIMIT_REMAINING,
        HeaderValue::from(status.remaining),
    );
    headers.insert(headers::X_RATE_LIMIT_RESET, HeaderValue::from(reset_at));
    if !status.allowed {
        headers.insert(
            headers::RETRY_AFTER,
            HeaderValue::from(status.reset_after_secs),
        );
    }
}

/// Count the request and reject it with 429 once the client's window is spent
pub async fn enforce_rate_limit(
    State(resources): State<Arc<ServerResources>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let limiter = &resources.rate_limiter;
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    let key = client_key(
        connect_info.map(|ConnectInfo(addr)| addr.ip()),
        request.headers(),
        &resources.config.rate_limit.trusted_proxies,
    );
    let status = limiter.check(&key);

    if !status.allowed {
        AppLogger::log_security_event(
            "rate_limit_exceeded",
            "medium",
            &format!("client {key} exceeded {} requests", status.limit),
            None,
        );
        let mut response =
            AppError::rate_limit_exceeded(status.limit, limiter.window_secs()).into_response();
        apply_rate_limit_headers(response.headers_mut(), &status);
        return response;
    }

    let mut response = next.run(request).await;
    apply_rate_limit_headers(response.headers_mut(), &status);
    response
}
