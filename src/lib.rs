// ABOUTME: Main library entry point for the Amara Spa booking platform
// ABOUTME: Provides the REST API for catalog, appointments, coupons, and payments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

#![deny(unsafe_code)]

//! # Amara Spa Server
//!
//! A booking backend for spa and salon businesses: user accounts with
//! roles, a service catalog, staff-to-service assignment, appointment
//! scheduling with availability checking, coupon-based discounting, and
//! payment capture (cash and an external PayPal-style gateway).
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Models**: domain data structures (users, services, appointments, payments)
//! - **Database**: SQLite persistence with idempotent schema migration
//! - **Booking**: availability checking, pricing, and staff auto-assignment
//! - **Gateway**: external payment processing behind a trait seam
//! - **Routes**: axum HTTP handlers with a uniform response envelope
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use amara_spa_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = ServerConfig::from_env()?;
//!
//!     println!("Amara Spa server configured for port {}", config.http_port);
//!
//!     Ok(())
//! }
//! ```

/// JWT issuance, validation, and password hashing
pub mod auth;

/// Booking orchestration: availability, pricing, and staff assignment
pub mod booking;

/// Configuration management
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Database access layer
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// External payment gateway abstraction and PayPal client
pub mod gateway;

/// Health checks and monitoring
pub mod health;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware for authentication and CORS
pub mod middleware;

/// Common data models for the booking domain
pub mod models;

/// Invoice notification seam
pub mod notifications;

/// Payment capture orchestration
pub mod payments;

/// Centralized dependency container
pub mod resources;

/// HTTP routes and the uniform response envelope
pub mod routes;

/// HTTP server assembly and lifecycle
pub mod server;
