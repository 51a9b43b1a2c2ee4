// ABOUTME: HTTP middleware for request tracing, authentication, CORS, and rate limiting
// ABOUTME: Provides request spans, bearer-token guards, and per-client request budgets

/// Bearer-token guard for protected routes
pub mod auth;
/// Cross-origin policy from configuration
pub mod cors;
/// Per-client request budget enforcement
pub mod rate_limiting;
/// Request spans and request ID header
pub mod tracing;

// Authentication middleware
pub use auth::require_auth;

// CORS configuration
pub use cors::setup_cors;

// Rate limiting middleware and utilities
pub use rate_limiting::{apply_rate_limit_headers, client_key, enforce_rate_limit, headers};

// Request tracing
pub use self::tracing::{create_request_span, REQUEST_ID_HEADER};
