// ABOUTME: Appointment route handlers for booking, listing, pricing, and transitions
// ABOUTME: Delegates orchestration to the BookingService
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Appointment routes

use crate::{
    booking::{authorize_appointment_access, pricing::PriceBreakdown, BookingRequest},
    errors::AppError,
    models::{Appointment, AppointmentStatus},
    resources::ServerResources,
    routes::{created, ok},
};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub service_ids: Vec<Uuid>,
    pub start_time: DateTime<Utc>,
    pub staff_id: Option<Uuid>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListAppointmentsQuery {
    /// Another customer's id; requires a staff or admin caller
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub appointment: Appointment,
    pub price: PriceBreakdown,
}

/// Appointment routes handler
pub struct AppointmentRoutes;

impl AppointmentRoutes {
    /// Create all appointment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/appointments", post(Self::handle_create))
            .route("/api/appointments", get(Self::handle_list))
            .route("/api/appointments/:id", get(Self::handle_get))
            .route("/api/appointments/:id/price", get(Self::handle_price))
            .route("/api/appointments/:id/status", put(Self::handle_update_status))
            .with_state(resources)
    }

    /// Handle POST /api/appointments - book for the authenticated customer
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateAppointmentRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;

        let outcome = resources
            .booking
            .book(BookingRequest {
                customer_id: auth.user_id,
                service_ids: body.service_ids,
                start_time: body.start_time,
                staff_id: body.staff_id,
                coupon_code: body.coupon_code,
            })
            .await?;

        Ok(created(
            "Appointment created successfully",
            AppointmentResponse {
                appointment: outcome.appointment,
                price: outcome.breakdown,
            },
        ))
    }

    /// Handle GET /api/appointments - own appointments, or another
    /// customer's for staff and admin callers
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListAppointmentsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;

        let customer_id = match query.user_id {
            Some(user_id) if user_id != auth.user_id => {
                if !auth.role.is_staff() {
                    return Err(AppError::permission_denied(
                        "You do not have permission to access this user's appointments",
                    ));
                }
                user_id
            }
            _ => auth.user_id,
        };

        let appointments = resources.booking.list_for_customer(customer_id).await?;
        Ok(ok("Appointments retrieved successfully", appointments))
    }

    /// Handle GET /api/appointments/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;
        let appointment = resources.booking.get_appointment(id).await?;
        authorize_appointment_access(&appointment, auth.user_id, auth.role)?;

        Ok(ok("Appointment retrieved successfully", appointment))
    }

    /// Handle GET /api/appointments/:id/price - breakdown at the current instant
    async fn handle_price(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;
        let appointment = resources.booking.get_appointment(id).await?;
        authorize_appointment_access(&appointment, auth.user_id, auth.role)?;

        let breakdown = resources.booking.price_existing(id).await?;
        Ok(ok("Price breakdown computed successfully", breakdown))
    }

    /// Handle PUT /api/appointments/:id/status
    async fn handle_update_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateStatusRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;

        let updated = resources
            .booking
            .transition_status(id, body.status, auth.user_id, auth.role)
            .await?;

        Ok(ok("Appointment updated successfully", updated))
    }
}
