// ABOUTME: Server health monitoring and system status checks
// ABOUTME: Provides the health endpoint payload and component checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Health check endpoints and monitoring utilities

use crate::constants::service_names;
use crate::database::Database;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Overall health status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: HealthStatus,
    /// Service information
    pub service: ServiceInfo,
    /// Individual component checks
    pub checks: Vec<ComponentHealth>,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

/// Service information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name
    pub name: String,
    /// Service version
    pub version: String,
    /// Service uptime in seconds
    pub uptime_seconds: u64,
}

/// Individual component health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Status description
    pub message: String,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Health checker for the Amara Spa server
pub struct HealthChecker {
    start_time: Instant,
    database: Arc<Database>,
}

impl HealthChecker {
    /// Create a health checker
    #[must_use]
    pub fn new(database: Arc<Database>) -> Self {
        Self {
            start_time: Instant::now(),
            database,
        }
    }

    /// Run all component checks and assemble the health response
    pub async fn check(&self) -> HealthResponse {
        let started = Instant::now();

        let database = self.check_database().await;
        let status = if database.status == HealthStatus::Healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        HealthResponse {
            status,
            service: ServiceInfo {
                name: service_names::AMARA_SPA_SERVER.into(),
                version: service_names::SERVER_VERSION.into(),
                uptime_seconds: self.start_time.elapsed().as_secs(),
            },
            checks: vec![database],
            response_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    async fn check_database(&self) -> ComponentHealth {
        let started = Instant::now();
        let (status, message) = match self.database.ping().await {
            Ok(()) => (HealthStatus::Healthy, "database reachable".into()),
            Err(e) => (HealthStatus::Unhealthy, format!("database check failed: {e}")),
        };

        ComponentHealth {
            name: "database".into(),
            status,
            message,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}
