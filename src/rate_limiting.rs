// ABOUTME: Global fixed-window rate limiter keyed by client address
// ABOUTME: Uses a sharded concurrent map with lazy cleanup of stale client windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Rate Limiting
//!
//! Every request is counted against its client key (IP address, or `"unknown"`)
//! inside a fixed window. When the window elapses the counter resets on the next
//! request. Entries for clients whose window has long expired are swept only
//! once the map grows past a threshold, and then at most once per sweep interval,
//! so the hot path stays a single shard lock.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use fitcoach_core::constants::rate_limit::CLEANUP_THRESHOLD;

use crate::config::RateLimitConfig;

/// Upper bound on the time between sweeps of an oversized map
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Requests allowed per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Seconds until the current window resets
    pub reset_after_secs: u64,
}

/// Fixed-window limiter with per-client tracking using a sharded concurrent map
#[derive(Clone)]
pub struct RateLimiter {
    /// Client key -> (`request_count`, `window_start`)
    state: Arc<DashMap<String, (u32, Instant)>>,
    last_sweep: Arc<Mutex<Instant>>,
    max_requests: u32,
    window: Duration,
    enabled: bool,
}

impl RateLimiter {
    /// Create a limiter from configuration
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            state: Arc::new(DashMap::new()),
            last_sweep: Arc::new(Mutex::new(Instant::now())),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
            enabled: config.enabled,
        }
    }

    /// Whether requests are being limited at all
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Requests allowed per window
    #[must_use]
    pub const fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Window length in seconds
    #[must_use]
    pub const fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }

    /// Count one request for `client_key` at the current instant
    #[must_use]
    pub fn check(&self, client_key: &str) -> RateLimitStatus {
        self.check_at(client_key, Instant::now())
    }

    /// Count one request for `client_key` at `now`
    #[must_use]
    pub fn check_at(&self, client_key: &str, now: Instant) -> RateLimitStatus {
        let status = {
            let mut entry = self
                .state
                .entry(client_key.to_owned())
                .or_insert((0, now));
            let (count, window_start) = entry.value_mut();

            if now.saturating_duration_since(*window_start) >= self.window {
                *count = 0;
                *window_start = now;
            }

            let reset_after = self
                .window
                .saturating_sub(now.saturating_duration_since(*window_start));
            // Round up so clients never retry a fraction of a second early
            let reset_after_secs = reset_after.as_secs() + u64::from(reset_after.subsec_nanos() > 0);

            if *count >= self.max_requests {
                RateLimitStatus {
                    allowed: false,
                    limit: self.max_requests,
                    remaining: 0,
                    reset_after_secs,
                }
            } else {
                *count += 1;
                RateLimitStatus {
                    allowed: true,
                    limit: self.max_requests,
                    remaining: self.max_requests - *count,
                    reset_after_secs,
                }
            }
        };

        if self.state.len() > CLEANUP_THRESHOLD {
            self.sweep_if_due(now);
        }

        status
    }

    /// Sweep unless another thread is sweeping or the last sweep was too recent
    fn sweep_if_due(&self, now: Instant) {
        let Ok(mut last_sweep) = self.last_sweep.try_lock() else {
            return;
        };
        if now.saturating_duration_since(*last_sweep) < self.window.min(MAX_SWEEP_INTERVAL) {
            return;
        }
        *last_sweep = now;
        self.cleanup_expired(now);
    }

    /// Drop entries whose window ended before `now`
    pub fn cleanup_expired(&self, now: Instant) {
        let window = self.window;
        self.state
            .retain(|_, (_, window_start)| now.saturating_duration_since(*window_start) < window);
    }

    /// Number of tracked clients
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.state.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            max_requests,
            window_secs,
            trusted_proxies: Vec::new(),
        })
    }

    #[test]
    fn test_blocks_after_limit() {
        let limiter = limiter(3, 900);
        let now = Instant::now();
        for expected_remaining in [2, 1, 0] {
            let status = limiter.check_at("10.0.0.1", now);
            assert!(status.allowed);
            assert_eq!(status.remaining, expected_remaining);
        }
        let status = limiter.check_at("10.0.0.1", now);
        assert!(!status.allowed);
        assert_eq!(status.reset_after_secs, 900);

        // Other clients are independent
        assert!(limiter.check_at("10.0.0.2", now).allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1, 60);
        let start = Instant::now();
        assert!(limiter.check_at("client", start).allowed);
        assert!(!limiter.check_at("client", start + Duration::from_secs(30)).allowed);

        let status = limiter.check_at("client", start + Duration::from_secs(60));
        assert!(status.allowed);
        assert_eq!(status.remaining, 0);
    }

    #[test]
    fn test_cleanup_removes_expired_entries() {
        let limiter = limiter(5, 10);
        let start = Instant::now();
        let _ = limiter.check_at("old", start);
        let _ = limiter.check_at("fresh", start + Duration::from_secs(8));
        limiter.cleanup_expired(start + Duration::from_secs(12));
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_oversized_map_is_swept_at_most_once_per_interval() {
        let limiter = limiter(5, 10);
        let start = Instant::now();
        for n in 0..=CLEANUP_THRESHOLD {
            let _ = limiter.check_at(&format!("client-{n}"), start);
        }

        // Every earlier window has ended, so the sweep keeps only this client
        let _ = limiter.check_at("late", start + Duration::from_secs(11));
        assert_eq!(limiter.tracked_clients(), 1);

        let refill = start + Duration::from_secs(12);
        for n in 0..=CLEANUP_THRESHOLD {
            let _ = limiter.check_at(&format!("burst-{n}"), refill);
        }
        let _ = limiter.check_at("soon", start + Duration::from_secs(13));
        assert!(limiter.tracked_clients() > CLEANUP_THRESHOLD);

        let _ = limiter.check_at("later", start + Duration::from_secs(30));
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
