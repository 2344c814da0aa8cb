// ABOUTME: Centralized resource container for dependency injection
// ABOUTME: Holds shared database, auth, booking, payment, and notifier handles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # Server Resources Module
//!
//! Centralized resource container for dependency injection. Routes receive
//! one `Arc<ServerResources>` as axum state instead of recreating expensive
//! objects per request.

use crate::auth::AuthManager;
use crate::booking::BookingService;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::gateway::PaymentGateway;
use crate::health::HealthChecker;
use crate::middleware::AuthGuard;
use crate::notifications::InvoiceNotifier;
use crate::payments::PaymentProcessor;
use std::sync::Arc;

/// Shared server resources
pub struct ServerResources {
    pub database: Arc<Database>,
    pub auth_manager: Arc<AuthManager>,
    pub auth_guard: AuthGuard,
    pub booking: BookingService,
    pub payments: PaymentProcessor,
    pub health: HealthChecker,
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Assemble the resource container from its building blocks
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        auth_manager: Arc<AuthManager>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn InvoiceNotifier>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let auth_guard = AuthGuard::new(auth_manager.clone(), database.clone());
        let booking = BookingService::new(database.clone(), notifier);
        let payments = PaymentProcessor::new(
            database.clone(),
            gateway,
            config.gateway.currency.clone(),
        );
        let health = HealthChecker::new(database.clone());

        Self {
            database,
            auth_manager,
            auth_guard,
            booking,
            payments,
            health,
            config,
        }
    }
}
