// ABOUTME: Logging configuration and structured logging setup for the FitCoach server
// ABOUTME: Picks JSON or human-readable output per environment and provides domain event helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Structured logging
//!
//! Production defaults to one JSON object per line on stdout; everything else
//! defaults to the pretty formatter. `LOG_FORMAT` overrides either choice and
//! `RUST_LOG` overrides the level. Domain events (authentication, AI calls,
//! security) go through [`AppLogger`] so their field names stay stable.

use std::env;
use std::io;

use anyhow::Result;
use fitcoach_core::constants::service_names;
use tracing::{info, warn, Level};
use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Targets that are noisy at `info`
const QUIET_TARGETS: &[(&str, Level)] = &[
    ("hyper", Level::WARN),
    ("reqwest", Level::WARN),
    ("sqlx", Level::WARN),
    ("tower_http", Level::INFO),
];

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Multi-field human-readable lines
    Pretty,
    /// Single-line output without targets
    Compact,
}

impl LogFormat {
    /// Parse `LOG_FORMAT`, falling back to the environment's default
    #[must_use]
    pub fn from_str_or(value: Option<&str>, production: bool) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("json") => Self::Json,
            Some("pretty") => Self::Pretty,
            Some("compact") => Self::Compact,
            _ if production => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level directive when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Add file, line, and thread to every event
    pub verbose_metadata: bool,
    /// Deployment environment label
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            verbose_metadata: false,
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `LOG_VERBOSE`, and `ENVIRONMENT`
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let production = matches!(environment.to_lowercase().as_str(), "production" | "prod");

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: LogFormat::from_str_or(env::var("LOG_FORMAT").ok().as_deref(), production),
            verbose_metadata: production || env::var("LOG_VERBOSE").is_ok(),
            environment,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        QUIET_TARGETS
            .iter()
            .filter_map(|(target, level)| format!("{target}={level}").parse::<Directive>().ok())
            .fold(EnvFilter::new(&self.level), EnvFilter::add_directive)
    }

    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let layer = fmt::layer()
            .with_file(self.verbose_metadata)
            .with_line_number(self.verbose_metadata)
            .with_thread_ids(self.verbose_metadata)
            .with_writer(io::stdout);

        match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init()?,
            LogFormat::Pretty => registry.with(layer).try_init()?,
            LogFormat::Compact => registry.with(layer.compact().with_target(false)).try_init()?,
        }

        info!(
            service.name = service_names::FITCOACH_SERVER,
            service.version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Domain event logging with stable field names
pub struct AppLogger;

impl AppLogger {
    /// Registration and login outcomes
    pub fn log_auth_event(user_id: &str, event: &str, success: bool, details: Option<&str>) {
        info!(
            user.id = %user_id,
            auth.event = %event,
            auth.success = success,
            auth.details = details.unwrap_or(""),
            "Authentication event"
        );
    }

    /// Outbound LLM call; never includes prompt or reply text
    pub fn log_ai_call(
        user_id: &str,
        operation: &str,
        model: &str,
        success: bool,
        duration_ms: u64,
    ) {
        info!(
            user.id = %user_id,
            ai.operation = %operation,
            ai.model = %model,
            ai.success = success,
            ai.duration_ms = duration_ms,
            "AI coach call"
        );
    }

    /// Security-relevant events such as rate limit rejections
    pub fn log_security_event(
        event_type: &str,
        severity: &str,
        details: &str,
        user_id: Option<&str>,
    ) {
        warn!(
            security.event = %event_type,
            security.severity = %severity,
            security.details = %details,
            user.id = user_id.unwrap_or("unknown"),
            "Security event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_environment() {
        assert_eq!(LogFormat::from_str_or(None, true), LogFormat::Json);
        assert_eq!(LogFormat::from_str_or(None, false), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str_or(Some("COMPACT"), true), LogFormat::Compact);
        assert_eq!(LogFormat::from_str_or(Some("xml"), false), LogFormat::Pretty);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.verbose_metadata);
    }
}
