// ABOUTME: Integration tests for the per-client rate limiting middleware
// ABOUTME: Drives the full router and checks 429 responses and limit headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::connect_info::MockConnectInfo;
use axum::http::StatusCode;
use axum::Router;
use fitcoach_server::config::RateLimitConfig;
use fitcoach_server::resources::ServerResources;
use helpers::axum_test::AxumTestRequest;
use serde_json::Value;

const PROXY: [u8; 4] = [10, 0, 0, 1];

async fn limited_resources(max_requests: u32) -> Arc<ServerResources> {
    limited_resources_behind(max_requests, Vec::new()).await
}

async fn limited_resources_behind(
    max_requests: u32,
    trusted_proxies: Vec<IpAddr>,
) -> Arc<ServerResources> {
    let mut config = common::test_config();
    config.rate_limit = RateLimitConfig {
        enabled: true,
        max_requests,
        window_secs: 60,
        trusted_proxies,
    };
    common::create_resources_with(config, None).await.unwrap()
}

/// Router whose requests all arrive from `peer`
fn app_from(resources: &Arc<ServerResources>, peer: [u8; 4]) -> Router {
    common::app(resources).layer(MockConnectInfo(SocketAddr::from((peer, 40_000))))
}

#[tokio::test]
async fn test_allowed_responses_carry_limit_headers() {
    let resources = limited_resources(2).await;

    let response = AxumTestRequest::get("/health")
        .send(app_from(&resources, [198, 51, 100, 1]))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(response.header("x-ratelimit-limit"), Some("2"));
    assert_eq!(response.header("x-ratelimit-remaining"), Some("1"));
    let reset: i64 = response
        .header("x-ratelimit-reset")
        .unwrap()
        .parse()
        .unwrap();
    assert!(reset >= chrono::Utc::now().timestamp());
    assert!(response.header("retry-after").is_none());
}

#[tokio::test]
async fn test_exhausted_client_gets_429() {
    let resources = limited_resources(2).await;
    let app = app_from(&resources, [198, 51, 100, 2]);

    for _ in 0..2 {
        AxumTestRequest::get("/health")
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK);
    }

    let response = AxumTestRequest::get("/health")
        .send(app)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(response.header("x-ratelimit-remaining"), Some("0"));
    let retry_after: u64 = response.header("retry-after").unwrap().parse().unwrap();
    assert!(retry_after > 0 && retry_after <= 60);

    let body: Value = response.json();
    assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn test_clients_are_limited_independently() {
    let resources = limited_resources(1).await;

    AxumTestRequest::get("/health")
        .send(app_from(&resources, [203, 0, 113, 10]))
        .await
        .assert_status(StatusCode::OK);
    AxumTestRequest::get("/health")
        .send(app_from(&resources, [203, 0, 113, 10]))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    AxumTestRequest::get("/health")
        .send(app_from(&resources, [203, 0, 113, 11]))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_forwarded_header_does_not_reset_budget() {
    let resources = limited_resources(1).await;
    let app = app_from(&resources, [198, 51, 100, 9]);

    AxumTestRequest::get("/health")
        .header("x-forwarded-for", "203.0.113.1")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    for n in 2..50 {
        AxumTestRequest::get("/health")
            .header("x-forwarded-for", &format!("203.0.113.{n}"))
            .send(app.clone())
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_addresses() {
    let resources = limited_resources_behind(1, vec![IpAddr::from(PROXY)]).await;
    let app = app_from(&resources, PROXY);

    AxumTestRequest::get("/health")
        .header("x-forwarded-for", "203.0.113.10")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
    AxumTestRequest::get("/health")
        .header("x-forwarded-for", "203.0.113.11")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    // A spoofed leftmost hop does not hide the address the proxy saw
    AxumTestRequest::get("/health")
        .header("x-forwarded-for", "192.0.2.99, 203.0.113.10")
        .send(app.clone())
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    // Requests without the header are keyed on the proxy itself
    AxumTestRequest::get("/health")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
    AxumTestRequest::get("/health")
        .send(app)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_unknown_routes_count_against_the_budget() {
    let resources = limited_resources(1).await;
    let app = app_from(&resources, [192, 0, 2, 5]);

    AxumTestRequest::get("/nope")
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::get("/health")
        .send(app)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_disabled_limiter_adds_no_headers() {
    let resources = common::create_test_resources().await.unwrap();

    let response = AxumTestRequest::get("/health")
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::OK);
    assert!(response.header("x-ratelimit-limit").is_none());
}
