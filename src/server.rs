// ABOUTME: HTTP server assembly: router construction, middleware layers, and serving
// ABOUTME: Binds the listener and runs axum with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # HTTP Server
//!
//! Assembles the per-domain routers into one axum application, layers CORS
//! and request tracing, and serves until ctrl-c.

use crate::errors::AppResult;
use crate::middleware::cors::setup_cors;
use crate::resources::ServerResources;
use crate::routes::{
    appointments::AppointmentRoutes, assignments::AssignmentRoutes, auth::AuthRoutes,
    coupons::CouponRoutes, health::HealthRoutes, payments::PaymentRoutes,
    services::ServiceRoutes,
};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The assembled API server
pub struct BookingServer {
    resources: Arc<ServerResources>,
}

impl BookingServer {
    /// Create a server over shared resources
    #[must_use]
    pub fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the full application router; exposed for integration tests
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .merge(AuthRoutes::routes(self.resources.clone()))
            .merge(ServiceRoutes::routes(self.resources.clone()))
            .merge(CouponRoutes::routes(self.resources.clone()))
            .merge(AssignmentRoutes::routes(self.resources.clone()))
            .merge(AppointmentRoutes::routes(self.resources.clone()))
            .merge(PaymentRoutes::routes(self.resources.clone()))
            .merge(HealthRoutes::routes(self.resources.clone()))
            .layer(setup_cors(&self.resources.config))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured port and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails.
    pub async fn run(&self) -> AppResult<()> {
        let addr = format!("0.0.0.0:{}", self.resources.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::errors::AppError::internal(format!("failed to bind {addr}: {e}")))?;

        info!("HTTP server listening on {addr}");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::errors::AppError::internal(format!("server error: {e}")))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
        return;
    }
    info!("shutdown signal received");
}
