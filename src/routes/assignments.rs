// ABOUTME: Staff assignment route handlers
// ABOUTME: Admin-only pairing of staff members with the services they perform
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Staff assignment routes

use crate::{
    errors::AppError,
    models::StaffAssignment,
    resources::ServerResources,
    routes::created,
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
pub struct CreateAssignmentRequest {
    pub staff_id: Uuid,
    pub service_id: Uuid,
    #[serde(default)]
    pub is_primary: bool,
}

/// Staff assignment routes handler
pub struct AssignmentRoutes;

impl AssignmentRoutes {
    /// Create all assignment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/assignments", post(Self::handle_create))
            .with_state(resources)
    }

    /// Handle POST /api/assignments - admin only
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateAssignmentRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;
        if !auth.role.is_admin() {
            return Err(AppError::permission_denied(
                "Only admins may manage staff assignments",
            ));
        }

        // The assignee must hold a staff-capable role; customers never
        // qualify regardless of what the request claims
        let staff = resources
            .database
            .get_user(body.staff_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", body.staff_id)))?;
        if !staff.role.is_staff() {
            return Err(AppError::invalid_input(format!(
                "User {} is not a staff member",
                body.staff_id
            )));
        }

        let service = resources
            .database
            .get_service(body.service_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Service {}", body.service_id)))?;

        let assignment = StaffAssignment::new(staff.id, service.id, body.is_primary);
        resources.database.create_staff_assignment(&assignment).await?;

        Ok(created("Staff assignment created successfully", assignment))
    }
}
