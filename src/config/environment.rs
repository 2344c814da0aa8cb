// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Environment-based configuration management for production deployment

use crate::constants::{env_config, limits};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Environment type for security and logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
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
    pub fn is_production(&self) -> bool {
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

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL; `sqlite:` URLs get `?mode=rwc` appended automatically
    pub url: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret; generated at startup when unset
    pub jwt_secret: Option<String>,
    /// Token lifetime in hours
    pub token_expiry_hours: i64,
}

/// External payment gateway configuration (PayPal-style REST API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API base URL, e.g. `https://api.sandbox.paypal.com`
    pub base_url: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Where the gateway redirects the payer after approval
    pub return_url: String,
    /// Where the gateway redirects the payer after cancellation
    pub cancel_url: String,
    /// ISO 4217 currency code used for all transactions
    pub currency: String,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origin list, or "*" for any origin
    pub allowed_origins: String,
}

/// Complete server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Payment gateway settings
    pub gateway: GatewayConfig,
    /// CORS settings
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a present variable fails to parse (e.g. a
    /// non-numeric `HTTP_PORT`) or a gateway redirect URL is malformed.
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("invalid HTTP_PORT value: {value}"))?,
            Err(_) => env_config::http_port(),
        };

        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        );

        let token_expiry_hours = match env::var("JWT_EXPIRY_HOURS") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("invalid JWT_EXPIRY_HOURS value: {value}"))?,
            Err(_) => limits::USER_SESSION_EXPIRY_HOURS,
        };

        let gateway = GatewayConfig {
            base_url: env::var("PAYPAL_BASE_URL")
                .unwrap_or_else(|_| "https://api.sandbox.paypal.com".into()),
            client_id: env::var("PAYPAL_CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("PAYPAL_CLIENT_SECRET").unwrap_or_default(),
            return_url: env::var("PAYPAL_RETURN_URL")
                .unwrap_or_else(|_| "http://localhost:3000/payments/return".into()),
            cancel_url: env::var("PAYPAL_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:3000/payments/cancel".into()),
            currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "USD".into()),
        };

        for (name, value) in [
            ("PAYPAL_BASE_URL", &gateway.base_url),
            ("PAYPAL_RETURN_URL", &gateway.return_url),
            ("PAYPAL_CANCEL_URL", &gateway.cancel_url),
        ] {
            url::Url::parse(value).with_context(|| format!("invalid {name}: {value}"))?;
        }

        Ok(Self {
            http_port,
            environment,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| env_config::database_url()),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").ok(),
                token_expiry_hours,
            },
            gateway,
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".into()),
            },
        })
    }

    /// One-line configuration summary for startup logging; secrets omitted
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} environment={} database={} gateway={} currency={} cors={}",
            self.http_port,
            self.environment,
            self.database.url,
            self.gateway.base_url,
            self.gateway.currency,
            self.cors.allowed_origins
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("TESTING"),
            Environment::Testing
        );
        assert_eq!(
            Environment::from_str_or_default("anything-else"),
            Environment::Development
        );
    }

    #[test]
    fn test_summary_omits_secrets() {
        let config = ServerConfig {
            http_port: 8081,
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "sqlite::memory:".into(),
            },
            auth: AuthConfig {
                jwt_secret: Some("super-secret".into()),
                token_expiry_hours: 24,
            },
            gateway: GatewayConfig {
                base_url: "https://api.sandbox.paypal.com".into(),
                client_id: "client".into(),
                client_secret: "gateway-secret".into(),
                return_url: "http://localhost:3000/payments/return".into(),
                cancel_url: "http://localhost:3000/payments/cancel".into(),
                currency: "USD".into(),
            },
            cors: CorsConfig {
                allowed_origins: "*".into(),
            },
        };

        let summary = config.summary();
        assert!(!summary.contains("super-secret"));
        assert!(!summary.contains("gateway-secret"));
        assert!(summary.contains("8081"));
    }
}
