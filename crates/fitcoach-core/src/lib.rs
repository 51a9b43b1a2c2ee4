// ABOUTME: Core types and constants for the FitCoach coaching platform
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![deny(unsafe_code)]

//! # FitCoach Core
//!
//! Foundation crate providing shared types and constants for the FitCoach
//! coaching backend. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`
//! - **constants**: Application-wide constants organized by domain
//! - **models**: Domain records (users, profiles, plans, logs, achievements)

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration values organized by domain
pub mod constants;

/// Core data models (User, `UserProfile`, plans, logs, achievements)
pub mod models;
