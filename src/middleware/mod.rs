// ABOUTME: HTTP middleware: request authentication and CORS configuration
// ABOUTME: Re-exports the AuthGuard used by every protected route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! HTTP middleware

/// Bearer-token authentication for protected routes
pub mod auth;

/// CORS layer configuration
pub mod cors;

pub use auth::{AuthGuard, AuthenticatedUser};
