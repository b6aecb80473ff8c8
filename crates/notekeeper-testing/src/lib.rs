//! Test utilities for Notekeeper services.
//!
//! Import from `[dev-dependencies]` only.

pub mod auth;

/// Signing secret shared by service tests.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";
