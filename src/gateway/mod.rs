// ABOUTME: Payment gateway abstraction for external card/PayPal processing
// ABOUTME: Defines the PaymentGateway trait, request/approval types, and GatewayError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # Payment Gateway
//!
//! External payment processing happens behind the [`PaymentGateway`] trait:
//! a create step returns an approval handle the payer follows, and an
//! execute step finalizes the transaction with the payer's identifiers.
//! Gateway-side failures are surfaced verbatim to the caller and never
//! mutate appointment state.

pub mod paypal;

pub use paypal::PayPalGateway;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One itemized line of a gateway transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentItem {
    /// Line description shown to the payer
    pub name: String,
    /// Line amount; discounts appear as negative lines
    pub amount: Decimal,
}

/// Request for the gateway create step
#[derive(Debug, Clone)]
pub struct GatewayPaymentRequest {
    /// Appointment the payment settles, used as the transaction reference
    pub appointment_id: Uuid,
    /// Human-readable transaction description
    pub description: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// Amount to capture; must equal the sum of `items`
    pub total: Decimal,
    /// Itemized lines
    pub items: Vec<PaymentItem>,
}

/// Approval handle returned by the gateway create step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayApproval {
    /// Gateway-side payment identifier
    pub payment_id: String,
    /// URL the payer visits to approve the transaction
    pub approval_url: String,
}

/// Final transaction state returned by the gateway execute step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayExecution {
    /// Gateway-side payment identifier
    pub payment_id: String,
    /// Gateway-reported state, e.g. "approved"
    pub state: String,
}

/// Gateway-side failure, reported verbatim
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure reaching the gateway
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The gateway rejected the operation
    #[error("gateway rejected the operation: {detail}")]
    Rejected {
        /// Gateway response body, passed through unmodified
        detail: String,
    },
    /// Client-credential authentication with the gateway failed
    #[error("gateway authentication failed: {0}")]
    Auth(String),
}

/// External payment processor seam
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment and obtain an approval handle
    async fn create_payment(
        &self,
        request: &GatewayPaymentRequest,
    ) -> Result<GatewayApproval, GatewayError>;

    /// Finalize an approved payment
    async fn execute_payment(
        &self,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<GatewayExecution, GatewayError>;
}
