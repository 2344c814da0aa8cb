// ABOUTME: Coupon route handlers for creation and cart validation
// ABOUTME: Admin-only coupon management plus the public-facing validate endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Coupon routes

use crate::{
    booking::pricing::price_appointment,
    constants::error_messages,
    errors::AppError,
    models::Coupon,
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
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_percent: Decimal,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    /// Service ids in the cart
    pub services: Vec<Uuid>,
    /// Coupon code to validate; absent means "price the cart undiscounted"
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateCouponResponse {
    pub base_total: Decimal,
    pub final_total: Decimal,
    pub discount_percentage: Decimal,
    pub discount_amount: Decimal,
    pub coupon_code: Option<String>,
}

/// Coupon routes handler
pub struct CouponRoutes;

impl CouponRoutes {
    /// Create all coupon routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/coupons", post(Self::handle_create))
            .route("/api/coupons/validate", post(Self::handle_validate))
            .with_state(resources)
    }

    /// Handle POST /api/coupons - admin only
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateCouponRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;
        if !auth.role.is_admin() {
            return Err(AppError::permission_denied("Only admins may manage coupons"));
        }

        if body.code.trim().is_empty() {
            return Err(AppError::invalid_input("Coupon code is required"));
        }
        if body.discount_percent < Decimal::ZERO {
            return Err(AppError::invalid_input("Discount cannot be negative"));
        }
        if body.valid_until < body.valid_from {
            return Err(AppError::invalid_input(
                "Coupon validity window ends before it starts",
            ));
        }

        let coupon = Coupon::new(
            body.code.trim().to_uppercase(),
            body.discount_percent,
            body.valid_from,
            body.valid_until,
        );
        resources.database.create_coupon(&coupon).await?;

        Ok(created("Coupon created successfully", coupon))
    }

    /// Handle POST /api/coupons/validate - price a cart with an optional coupon
    async fn handle_validate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ValidateCouponRequest>,
    ) -> Result<Response, AppError> {
        resources.auth_guard.authenticate(&headers).await?;

        let services = resources.database.get_services_by_ids(&body.services).await?;
        if services.is_empty() || services.len() != body.services.len() {
            return Err(AppError::invalid_input("Invalid services selected"));
        }

        let now = Utc::now();
        let coupon = match &body.coupon_code {
            Some(code) => {
                let coupon = resources
                    .database
                    .get_coupon_by_code(code)
                    .await?
                    .filter(|coupon| coupon.is_active(now))
                    .ok_or_else(|| {
                        AppError::invalid_input(error_messages::INVALID_OR_EXPIRED_COUPON)
                    })?;
                Some(coupon)
            }
            None => None,
        };

        let breakdown = price_appointment(&services, coupon.as_ref(), now);

        let message = if breakdown.applied_coupon.is_some() {
            "Coupon applied successfully"
        } else {
            "No coupon applied"
        };

        Ok(ok(
            message,
            ValidateCouponResponse {
                base_total: breakdown.base_total,
                final_total: breakdown.final_total,
                discount_percentage: coupon
                    .map(|c| c.discount_percent)
                    .unwrap_or(Decimal::ZERO),
                discount_amount: breakdown.total_discount,
                coupon_code: breakdown.applied_coupon,
            },
        ))
    }
}
