// ABOUTME: User account model for authentication and ownership
// ABOUTME: Password hashes are never serialized into API responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use serde::{Deserialize, Serialize};

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID v4 identifier
    pub id: String,
    /// Login email, stored lowercase
    pub email: String,
    /// Optional display name
    pub name: Option<String>,
    /// bcrypt hash of the password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// RFC 3339 creation time
    pub created_at: String,
    /// RFC 3339 last update time
    pub updated_at: String,
}

impl User {
    /// Normalize an email address for storage and lookup
    #[must_use]
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Minimal structural email check (`local@domain.tld`)
    #[must_use]
    pub fn is_valid_email(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !email.chars().any(char::is_whitespace)
    }
}
