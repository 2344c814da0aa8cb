// ABOUTME: Payment route handlers for cash and gateway flows
// ABOUTME: Delegates capture logic to the PaymentProcessor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Payment routes

use crate::{
    errors::AppError,
    gateway::PaymentItem,
    resources::ServerResources,
    routes::{created, ok},
};
use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CashPaymentRequest {
    pub appointment_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GatewayPaymentRequestBody {
    pub appointment_id: Uuid,
    /// Explicit itemized lines; defaults to the service lines plus a
    /// discount line when absent
    pub items: Option<Vec<PaymentItem>>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteGatewayPaymentRequest {
    pub payment_id: String,
    pub payer_id: String,
}

/// Payment routes handler
pub struct PaymentRoutes;

impl PaymentRoutes {
    /// Create all payment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/payments/cash", post(Self::handle_cash))
            .route("/api/payments/gateway", post(Self::handle_gateway_create))
            .route(
                "/api/payments/gateway/execute",
                post(Self::handle_gateway_execute),
            )
            .with_state(resources)
    }

    /// Handle POST /api/payments/cash
    async fn handle_cash(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CashPaymentRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;

        let receipt = resources
            .payments
            .cash_payment(body.appointment_id, auth.user_id, auth.role)
            .await?;

        Ok(ok("Cash payment recorded successfully", receipt))
    }

    /// Handle POST /api/payments/gateway
    async fn handle_gateway_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<GatewayPaymentRequestBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;

        let approval = resources
            .payments
            .create_gateway_payment(body.appointment_id, auth.user_id, auth.role, body.items)
            .await?;

        Ok(created("Payment created successfully", approval))
    }

    /// Handle POST /api/payments/gateway/execute
    async fn handle_gateway_execute(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ExecuteGatewayPaymentRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;

        let execution = resources
            .payments
            .execute_gateway_payment(&body.payment_id, &body.payer_id, auth.user_id, auth.role)
            .await?;

        Ok(ok("Payment executed successfully", execution))
    }
}
