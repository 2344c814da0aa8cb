// ABOUTME: Service catalog route handlers
// ABOUTME: Public listing/retrieval plus admin-only catalog management
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Service catalog routes

use crate::{
    constants::limits,
    errors::AppError,
    models::Service,
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
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListServicesQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub price: Decimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<u32>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ServiceListResponse {
    pub services: Vec<Service>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

/// Service catalog routes handler
pub struct ServiceRoutes;

impl ServiceRoutes {
    /// Create all catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/services", get(Self::handle_list))
            .route("/api/services", post(Self::handle_create))
            .route("/api/services/:id", get(Self::handle_get))
            .route("/api/services/:id", put(Self::handle_update))
            .with_state(resources)
    }

    /// Handle GET /api/services - paginated public listing
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListServicesQuery>,
    ) -> Result<Response, AppError> {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query
            .page_size
            .unwrap_or(limits::DEFAULT_PAGE_SIZE)
            .clamp(1, limits::MAX_PAGE_SIZE);
        let offset = (page - 1) * page_size;

        let services = resources.database.list_services(page_size, offset).await?;
        let total = resources.database.count_services().await?;

        Ok(ok(
            "Services retrieved successfully",
            ServiceListResponse {
                services,
                page,
                page_size,
                total,
            },
        ))
    }

    /// Handle GET /api/services/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let service = resources
            .database
            .get_service(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Service {id}")))?;

        Ok(ok("Service retrieved successfully", service))
    }

    /// Handle POST /api/services - admin only
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateServiceRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;
        if !auth.role.is_admin() {
            return Err(AppError::permission_denied("Only admins may manage the catalog"));
        }

        if body.name.trim().is_empty() {
            return Err(AppError::invalid_input("Service name is required"));
        }
        if body.price < Decimal::ZERO {
            return Err(AppError::invalid_input("Service price cannot be negative"));
        }

        let mut service = Service::new(
            body.name.trim().to_string(),
            body.description,
            body.duration_minutes,
            body.price,
        );
        service.image_url = body.image_url;

        resources.database.create_service(&service).await?;

        Ok(created("Service created successfully", service))
    }

    /// Handle PUT /api/services/:id - admin only
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateServiceRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;
        if !auth.role.is_admin() {
            return Err(AppError::permission_denied("Only admins may manage the catalog"));
        }

        let mut service = resources
            .database
            .get_service(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Service {id}")))?;

        if let Some(name) = body.name {
            if name.trim().is_empty() {
                return Err(AppError::invalid_input("Service name cannot be empty"));
            }
            service.name = name.trim().to_string();
        }
        if let Some(description) = body.description {
            service.description = description;
        }
        if let Some(duration) = body.duration_minutes {
            service.duration_minutes = duration;
        }
        if let Some(price) = body.price {
            if price < Decimal::ZERO {
                return Err(AppError::invalid_input("Service price cannot be negative"));
            }
            service.price = price;
        }
        if let Some(image_url) = body.image_url {
            service.image_url = Some(image_url);
        }

        resources.database.update_service(&service).await?;

        Ok(ok("Service updated successfully", service))
    }
}
