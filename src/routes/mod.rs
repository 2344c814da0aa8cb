// ABOUTME: HTTP route modules and the uniform response envelope
// ABOUTME: Every endpoint answers {success, message, data, status_code}
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # HTTP Routes
//!
//! Route handlers per domain. Every response, success or failure, uses the
//! uniform envelope `{success, message, data, status_code}`; failures are
//! produced by [`crate::errors::AppError`]'s `IntoResponse` implementation.

/// Appointment booking and lifecycle endpoints
pub mod appointments;

/// Registration, login, Google sign-in, and profile endpoints
pub mod auth;

/// Staff assignment management endpoints
pub mod assignments;

/// Coupon management and validation endpoints
pub mod coupons;

/// Health endpoint
pub mod health;

/// Payment capture endpoints
pub mod payments;

/// Service catalog endpoints
pub mod services;

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;

/// Uniform response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub status_code: u16,
}

/// 200 OK envelope
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    envelope(StatusCode::OK, message, Some(data))
}

/// 201 Created envelope
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    envelope(StatusCode::CREATED, message, Some(data))
}

/// 200 OK envelope with no data payload
pub fn ok_empty(message: impl Into<String>) -> Response {
    envelope::<()>(StatusCode::OK, message, None)
}

fn envelope<T: Serialize>(
    status: StatusCode,
    message: impl Into<String>,
    data: Option<T>,
) -> Response {
    let body = ApiResponse {
        success: true,
        message: message.into(),
        data,
        status_code: status.as_u16(),
    };
    (status, Json(body)).into_response()
}
