// ABOUTME: Health endpoint route handler
// ABOUTME: Exposes service status and component checks at /health
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Health routes

use crate::health::HealthStatus;
use crate::resources::ServerResources;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use http::StatusCode;
use std::sync::Arc;

/// Health routes handler
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    /// Handle GET /health
    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Response {
        let response = resources.health.check().await;
        let status = if response.status == HealthStatus::Healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        (status, Json(response)).into_response()
    }
}
