// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory database, scripted gateway, and seed helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Shared test utilities for `amara_spa_server` integration tests

#![allow(dead_code)]

use amara_spa_server::{
    auth::{generate_jwt_secret, hash_password, AuthManager},
    config::environment::{
        AuthConfig, CorsConfig, DatabaseConfig, Environment, GatewayConfig, ServerConfig,
    },
    database::Database,
    gateway::{
        GatewayApproval, GatewayError, GatewayExecution, GatewayPaymentRequest, PaymentGateway,
    },
    models::{Coupon, Service, User, UserRole},
    notifications::{Invoice, InvoiceNotifier, LoggingNotifier, NotifyError},
    resources::ServerResources,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Password used for every seeded account
pub const TEST_PASSWORD: &str = "test-password-123";

/// Gateway double driven by flags; records call counts
#[derive(Default)]
pub struct ScriptedGateway {
    pub fail_create: bool,
    pub fail_execute: bool,
    pub create_calls: AtomicUsize,
    pub execute_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn rejecting_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn rejecting_execute() -> Self {
        Self {
            fail_execute: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_payment(
        &self,
        request: &GatewayPaymentRequest,
    ) -> Result<GatewayApproval, GatewayError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(GatewayError::Rejected {
                detail: "scripted create failure".into(),
            });
        }
        Ok(GatewayApproval {
            payment_id: format!("PAY-{}", request.appointment_id.simple()),
            approval_url: "https://gateway.test/approve".into(),
        })
    }

    async fn execute_payment(
        &self,
        payment_id: &str,
        _payer_id: &str,
    ) -> Result<GatewayExecution, GatewayError> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_execute {
            return Err(GatewayError::Rejected {
                detail: "scripted execute failure".into(),
            });
        }
        Ok(GatewayExecution {
            payment_id: payment_id.to_string(),
            state: "approved".into(),
        })
    }
}

/// Configuration suitable for tests; no environment reads
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        environment: Environment::Testing,
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
        },
        auth: AuthConfig {
            jwt_secret: None,
            token_expiry_hours: 24,
        },
        gateway: GatewayConfig {
            base_url: "https://gateway.test".into(),
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
            return_url: "https://app.test/payments/return".into(),
            cancel_url: "https://app.test/payments/cancel".into(),
            currency: "USD".into(),
        },
        cors: CorsConfig {
            allowed_origins: "*".into(),
        },
    }
}

/// Fresh in-memory database with migrations applied
pub async fn create_test_database() -> Arc<Database> {
    Arc::new(
        Database::new("sqlite::memory:")
            .await
            .expect("failed to create test database"),
    )
}

/// Full resource container over an in-memory database and the given gateway
pub async fn create_test_resources(gateway: Arc<dyn PaymentGateway>) -> Arc<ServerResources> {
    let database = create_test_database().await;
    let auth_manager = Arc::new(AuthManager::new(generate_jwt_secret().to_vec(), 24));

    Arc::new(ServerResources::new(
        database,
        auth_manager,
        gateway,
        Arc::new(LoggingNotifier),
        Arc::new(test_config()),
    ))
}

/// Resource container with an always-succeeding gateway
pub async fn create_default_resources() -> Arc<ServerResources> {
    create_test_resources(Arc::new(ScriptedGateway::succeeding())).await
}

/// Notifier that always fails delivery; bookings must survive it
pub struct FailingNotifier;

#[async_trait]
impl InvoiceNotifier for FailingNotifier {
    async fn send_invoice(&self, _invoice: &Invoice) -> Result<(), NotifyError> {
        Err(NotifyError {
            reason: "scripted notifier outage".into(),
        })
    }
}

/// Resource container whose invoice notifier always fails
pub async fn create_resources_with_failing_notifier() -> Arc<ServerResources> {
    let database = create_test_database().await;
    let auth_manager = Arc::new(AuthManager::new(generate_jwt_secret().to_vec(), 24));

    Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(ScriptedGateway::succeeding()),
        Arc::new(FailingNotifier),
        Arc::new(test_config()),
    ))
}

/// Seed an account with the given role and [`TEST_PASSWORD`]
pub async fn seed_user(database: &Database, email: &str, role: UserRole) -> User {
    let mut user = User::new(
        email.into(),
        hash_password(TEST_PASSWORD).expect("failed to hash test password"),
        role,
    );
    user.first_name = Some("Test".into());
    user.last_name = Some(match role {
        UserRole::Admin => "Admin",
        UserRole::Staff => "Staff",
        UserRole::Customer => "Customer",
    }
    .into());

    database
        .create_user(&user)
        .await
        .expect("failed to seed user");
    user
}

/// Seed a catalog service
pub async fn seed_service(
    database: &Database,
    name: &str,
    price: &str,
    duration_minutes: u32,
) -> Service {
    let service = Service::new(
        name.into(),
        format!("{name} for testing"),
        duration_minutes,
        Decimal::from_str(price).expect("invalid test price"),
    );
    database
        .create_service(&service)
        .await
        .expect("failed to seed service");
    service
}

/// Seed a coupon valid for the given window around now
pub async fn seed_coupon(
    database: &Database,
    code: &str,
    percent: &str,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
) -> Coupon {
    let coupon = Coupon::new(
        code.into(),
        Decimal::from_str(percent).expect("invalid test percent"),
        valid_from,
        valid_until,
    );
    database
        .create_coupon(&coupon)
        .await
        .expect("failed to seed coupon");
    coupon
}

/// Coupon active from an hour ago until a day from now
pub async fn seed_active_coupon(database: &Database, code: &str, percent: &str) -> Coupon {
    let now = Utc::now();
    seed_coupon(
        database,
        code,
        percent,
        now - Duration::hours(1),
        now + Duration::days(1),
    )
    .await
}

/// A slot start comfortably in the future, at a full hour
pub fn future_slot(days: i64, hour: u32) -> DateTime<Utc> {
    (Utc::now() + Duration::days(days))
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .expect("valid time")
        .and_utc()
}

/// Shorthand for ids used in error messages
pub fn short(id: Uuid) -> String {
    id.to_string()
}
