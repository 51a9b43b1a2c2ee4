// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database URL, JWT, LLM, rate limiting, and CORS settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Environment-based configuration management for production deployment

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use anyhow::{Context, Result};
use fitcoach_core::constants::{limits, llm, ports, rate_limit};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Minimum accepted JWT secret length in production
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL (`sqlite:./data/fitcoach.db`, `sqlite::memory:`)
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:./data/fitcoach.db".into(),
        }
    }
}

/// Token signing configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Whether the secret came from the environment rather than being generated
    pub secret_from_env: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("secret_from_env", &self.secret_from_env)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: generate_secret(),
            jwt_expiry_hours: limits::DEFAULT_SESSION_HOURS,
            secret_from_env: false,
        }
    }
}

/// External LLM API configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer key; coach endpoints are unavailable without it
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Outbound request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: llm::DEFAULT_BASE_URL.into(),
            model: llm::DEFAULT_MODEL.into(),
            timeout_secs: llm::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    /// Outbound request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fixed-window rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Global switch
    pub enabled: bool,
    /// Requests allowed per client per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
    /// Reverse proxies whose `x-forwarded-for` is believed; empty trusts no one
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: rate_limit::DEFAULT_MAX_REQUESTS,
            window_secs: rate_limit::DEFAULT_WINDOW_SECS,
            trusted_proxies: Vec::new(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `["*"]` allows any
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".into()],
        }
    }
}

/// Main server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Bind address
    pub host: IpAddr,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Token settings
    pub auth: AuthConfig,
    /// LLM client settings
    pub llm: LlmConfig,
    /// Rate limiter settings
    pub rate_limit: RateLimitConfig,
    /// CORS settings
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: ports::DEFAULT_HTTP_PORT,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            environment: Environment::Development,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            llm: LlmConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed, or if the resulting
    /// configuration fails [`Self::validate`]
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let environment = Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let port_value = env::var("HTTP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| ports::DEFAULT_HTTP_PORT.to_string());

        let auth = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => AuthConfig {
                jwt_secret: secret,
                jwt_expiry_hours: parse_env("JWT_EXPIRY_HOURS", limits::DEFAULT_SESSION_HOURS)?,
                secret_from_env: true,
            },
            _ => AuthConfig {
                jwt_expiry_hours: parse_env("JWT_EXPIRY_HOURS", limits::DEFAULT_SESSION_HOURS)?,
                ..AuthConfig::default()
            },
        };

        let config = Self {
            http_port: port_value
                .parse()
                .with_context(|| format!("Invalid HTTP_PORT value: {port_value}"))?,
            host: parse_env("HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            environment,
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", &DatabaseConfig::default().url),
            },
            auth,
            llm: LlmConfig {
                api_key: env::var("LLM_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                base_url: env_var_or("LLM_BASE_URL", llm::DEFAULT_BASE_URL),
                model: env_var_or("LLM_MODEL", llm::DEFAULT_MODEL),
                timeout_secs: parse_env("LLM_TIMEOUT_SECS", llm::DEFAULT_TIMEOUT_SECS)?,
            },
            rate_limit: RateLimitConfig {
                enabled: parse_env("RATE_LIMIT_ENABLED", true)?,
                max_requests: parse_env("RATE_LIMIT_MAX_REQUESTS", rate_limit::DEFAULT_MAX_REQUESTS)?,
                window_secs: parse_env("RATE_LIMIT_WINDOW_SECS", rate_limit::DEFAULT_WINDOW_SECS)?,
                trusted_proxies: parse_ip_list(
                    "RATE_LIMIT_TRUSTED_PROXIES",
                    &env_var_or("RATE_LIMIT_TRUSTED_PROXIES", ""),
                )?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error when production runs without an explicit strong JWT secret or
    /// when limiter / timeout values are zero
    pub fn validate(&self) -> Result<()> {
        if self.environment.is_production() {
            if !self.auth.secret_from_env {
                return Err(anyhow::anyhow!("JWT_SECRET is required in production"));
            }
            if self.auth.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN {
                return Err(anyhow::anyhow!(
                    "JWT_SECRET must be at least {MIN_PRODUCTION_SECRET_LEN} characters in production"
                ));
            }
        } else if !self.auth.secret_from_env {
            warn!("JWT_SECRET not set; using a random per-process secret (tokens will not survive restarts)");
        }

        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }
        if self.rate_limit.enabled
            && (self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0)
        {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_MAX_REQUESTS and RATE_LIMIT_WINDOW_SECS must be positive"
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(anyhow::anyhow!("LLM_TIMEOUT_SECS must be positive"));
        }
        if self.llm.api_key.is_none() {
            warn!("LLM_API_KEY not set; AI coach endpoints will answer 503");
        }
        Ok(())
    }

    /// Secret-free one-line summary for the startup log
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "FitCoach Server Configuration: environment={} bind={}:{} database={} llm={} (model {}, timeout {}s) rate_limit={} cors={}",
            self.environment,
            self.host,
            self.http_port,
            if self.database.url.contains(":memory:") {
                "SQLite (in-memory)"
            } else {
                "SQLite"
            },
            if self.llm.api_key.is_some() {
                "configured"
            } else {
                "not configured"
            },
            self.llm.model,
            self.llm.timeout_secs,
            if self.rate_limit.enabled {
                format!(
                    "{} req / {}s ({} trusted proxies)",
                    self.rate_limit.max_requests,
                    self.rate_limit.window_secs,
                    self.rate_limit.trusted_proxies.len()
                )
            } else {
                "disabled".to_owned()
            },
            self.cors.allowed_origins.join(","),
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {value}")),
        _ => Ok(default),
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Parse a comma-separated list of IP addresses
fn parse_ip_list(key: &str, value: &str) -> Result<Vec<IpAddr>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse()
                .with_context(|| format!("Invalid {key} entry: {entry}"))
        })
        .collect()
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://localhost:5173, https://app.fitcoach.app,"),
            vec!["http://localhost:5173", "https://app.fitcoach.app"]
        );
    }

    #[test]
    fn test_parse_ip_list() {
        assert!(parse_ip_list("K", "").unwrap().is_empty());
        assert_eq!(
            parse_ip_list("K", "10.0.0.1, ::1,").unwrap(),
            vec![
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                "::1".parse::<IpAddr>().unwrap()
            ]
        );
        assert!(parse_ip_list("K", "10.0.0.0/8").is_err());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str_or_default("prod"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("TEST"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default("staging"), Environment::Development);
    }

    #[test]
    fn test_production_requires_explicit_secret() {
        let config = ServerConfig {
            environment: Environment::Production,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            environment: Environment::Production,
            auth: AuthConfig {
                jwt_secret: "x".repeat(48),
                jwt_expiry_hours: 24,
                secret_from_env: true,
            },
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_summary_hides_secrets() {
        let config = ServerConfig {
            llm: LlmConfig {
                api_key: Some("sk-very-secret".into()),
                ..LlmConfig::default()
            },
            ..ServerConfig::default()
        };
        let summary = config.summary();
        assert!(!summary.contains("sk-very-secret"));
        assert!(!summary.contains(&config.auth.jwt_secret));
        assert!(summary.contains("llm=configured"));
    }
}
