// ABOUTME: Unified error type, error codes, and HTTP status mapping for the FitCoach API
// ABOUTME: Provides AppError/AppResult used by every layer, with axum and sqlx integrations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Unified Error Handling System
//!
//! This module provides a centralized error handling system for the FitCoach API.
//! It defines standard error codes and the JSON response format so every route
//! reports failures the same way: `{"error": "<message>", "code": "<ERROR_CODE>"}`.
//!
//! Internal failures (database, configuration, unexpected states) are logged with
//! full detail and returned to the client with a generic message only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication & Authorization
    /// No credentials were supplied
    AuthRequired,
    /// Credentials were supplied but are not valid
    AuthInvalid,
    /// Token is past its expiry
    AuthExpired,

    // Rate Limiting
    /// Client exceeded its request budget for the current window
    RateLimitExceeded,

    // Validation
    /// Input failed validation
    InvalidInput,
    /// A required field is absent
    MissingRequiredField,
    /// A value is outside the accepted range
    ValueOutOfRange,

    // Resource Management
    /// Requested entity does not exist (or is not owned by the caller)
    ResourceNotFound,
    /// Entity already exists or a uniqueness rule would be violated
    ResourceAlreadyExists,
    /// Entity is in a state that does not allow the operation
    ResourceConflict,
    /// A dependency of the resource is not available right now
    ResourceUnavailable,

    // External Services
    /// Upstream service (LLM API) failed
    ExternalServiceError,
    /// Upstream service answered with content that does not match the expected shape
    InvalidAiResponse,

    // Configuration
    /// Invalid or missing configuration
    ConfigError,

    // Internal Errors
    /// Unexpected internal failure
    InternalError,
    /// Database operation failed
    DatabaseError,
    /// Data serialization/deserialization failed
    SerializationError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::MissingRequiredField | Self::ValueOutOfRange => 400,
            Self::AuthRequired | Self::AuthInvalid | Self::AuthExpired => 401,
            Self::ResourceNotFound => 404,
            Self::ResourceAlreadyExists | Self::ResourceConflict => 409,
            Self::RateLimitExceeded => 429,
            Self::ExternalServiceError | Self::InvalidAiResponse => 502,
            Self::ResourceUnavailable => 503,
            Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError
            | Self::ConfigError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::AuthExpired => "The authentication token has expired",
            Self::RateLimitExceeded => "Too many requests, please try again later",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::ResourceConflict => "The resource is in a state that does not allow this action",
            Self::ResourceUnavailable => "The resource is temporarily unavailable",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::InvalidAiResponse => "The AI service returned an invalid response",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether the detailed message must stay server-side
    #[must_use]
    pub const fn is_internal(self) -> bool {
        matches!(
            self,
            Self::InternalError | Self::DatabaseError | Self::SerializationError | Self::ConfigError
        )
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
#[error("{}: {}", .code.description(), .message)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Message safe to show to API clients
    #[must_use]
    pub fn public_message(&self) -> &str {
        if self.code.is_internal() {
            "Internal server error"
        } else {
            &self.message
        }
    }

    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Invalid authentication
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Authentication expired
    #[must_use]
    pub fn auth_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Authentication token has expired")
    }

    /// Rate limit exceeded
    #[must_use]
    pub fn rate_limit_exceeded(limit: u32, window_secs: u64) -> Self {
        Self::new(
            ErrorCode::RateLimitExceeded,
            format!("Rate limit of {limit} requests per {window_secs} seconds exceeded"),
        )
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Required field missing
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field: {field}"),
        )
    }

    /// Value outside the accepted range
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValueOutOfRange, message)
    }

    /// Uniqueness violation
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceAlreadyExists, message)
    }

    /// Operation not allowed in the resource's current state
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceConflict, message)
    }

    /// Dependency temporarily unavailable
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceUnavailable, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Upstream AI answer could not be parsed into the expected shape
    pub fn invalid_ai_response(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAiResponse, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }
}

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Machine-readable error kind
    pub code: ErrorCode,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            error: error.public_message().to_owned(),
            code: error.code,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {error}")).with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        let code = match &error {
            sqlx::Error::RowNotFound => ErrorCode::ResourceNotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ErrorCode::ResourceAlreadyExists
            }
            _ => ErrorCode::DatabaseError,
        };
        let message = match code {
            ErrorCode::ResourceNotFound => "Record not found".to_owned(),
            ErrorCode::ResourceAlreadyExists => "Record already exists".to_owned(),
            _ => format!("Database error: {error}"),
        };
        Self::new(code, message).with_source(error)
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        if self.code.is_internal() {
            tracing::error!(error.code = ?self.code, error.source = ?self.source, "{}", self.message);
        } else if status.is_server_error() {
            tracing::warn!(error.code = ?self.code, "{}", self.message);
        } else {
            tracing::debug!(error.code = ?self.code, "{}", self.message);
        }

        (status, axum::Json(ErrorResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), 401);
        assert_eq!(ErrorCode::RateLimitExceeded.http_status(), 429);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::MissingRequiredField.http_status(), 400);
        assert_eq!(ErrorCode::InvalidAiResponse.http_status(), 502);
        assert_eq!(ErrorCode::DatabaseError.http_status(), 500);
    }

    #[test]
    fn test_internal_messages_are_hidden() {
        let error = AppError::database("UNIQUE constraint failed: users.email");
        let response = ErrorResponse::from(&error);
        assert_eq!(response.error, "Internal server error");
        assert_eq!(response.code, ErrorCode::DatabaseError);

        let error = AppError::missing_field("email");
        let response = ErrorResponse::from(&error);
        assert_eq!(response.error, "Missing required field: email");
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::invalid_ai_response("no JSON object found");
        let json = serde_json::to_value(ErrorResponse::from(&error)).unwrap();
        assert_eq!(json["code"], "INVALID_AI_RESPONSE");
        assert_eq!(json["error"], "no JSON object found");
    }

    #[test]
    fn test_display_includes_description() {
        let error = AppError::not_found("Workout plan");
        assert_eq!(
            error.to_string(),
            "The requested resource was not found: Workout plan not found"
        );
    }
}
