// ABOUTME: System-wide constants and configuration defaults for the Amara Spa API
// ABOUTME: Contains limits, default ports, and shared error message strings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # Constants Module
//!
//! Application constants and environment-based configuration values.

/// Service identity
pub mod service_names {
    /// Canonical server name used in logs and health responses
    pub const AMARA_SPA_SERVER: &str = "amara-spa-server";

    /// Server version from Cargo.toml
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Default network ports
pub mod ports {
    /// Default HTTP port for the API server
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Request and account limits
pub mod limits {
    /// Minimum accepted password length for registration and password changes
    pub const MIN_PASSWORD_LENGTH: usize = 8;

    /// JWT lifetime in hours
    pub const USER_SESSION_EXPIRY_HOURS: i64 = 24;

    /// Default page size for catalog listings
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    /// Maximum page size a client may request
    pub const MAX_PAGE_SIZE: u32 = 50;

    /// Maximum number of services on a single appointment
    pub const MAX_SERVICES_PER_APPOINTMENT: usize = 20;
}

/// Shared error message strings
pub mod error_messages {
    pub const INVALID_EMAIL_FORMAT: &str = "Invalid email format";
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters long";
    pub const PASSWORD_MISMATCH: &str = "Password confirmation does not match";
    pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
    pub const INVALID_OR_EXPIRED_COUPON: &str = "Invalid or expired coupon code";
    pub const SLOT_UNAVAILABLE: &str = "Selected time slot is not available";
}

/// Environment-variable driven defaults
pub mod env_config {
    use std::env;

    /// Get HTTP server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .unwrap_or_else(|_| super::ports::DEFAULT_HTTP_PORT.to_string())
            .parse()
            .unwrap_or(super::ports::DEFAULT_HTTP_PORT)
    }

    /// Get database URL from environment or default
    #[must_use]
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/amara.db".into())
    }
}
