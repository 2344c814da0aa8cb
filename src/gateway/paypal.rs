// ABOUTME: PayPal REST API client implementing the PaymentGateway trait
// ABOUTME: Handles client-credential OAuth, payment creation, and execution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! PayPal REST gateway
//!
//! Implements the v1 payments flow the original deployment used: a
//! client-credential token is fetched (and cached until shortly before it
//! expires), the create step posts an itemized sale transaction, and the
//! execute step finalizes with the payer id returned by the approval
//! redirect.

use super::{GatewayApproval, GatewayError, GatewayExecution, GatewayPaymentRequest, PaymentGateway};
use crate::config::environment::GatewayConfig;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Refresh the cached token this long before the gateway-reported expiry
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct PaymentLink {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct CreatePaymentResponse {
    id: String,
    #[serde(default)]
    links: Vec<PaymentLink>,
}

#[derive(Debug, Deserialize)]
struct ExecutePaymentResponse {
    id: String,
    state: String,
}

/// PayPal REST API client
pub struct PayPalGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    token: RwLock<Option<CachedToken>>,
}

impl PayPalGateway {
    /// Create a gateway client from configuration
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: RwLock::new(None),
        }
    }

    /// Format a decimal amount the way the gateway expects: two fraction digits
    fn format_amount(amount: Decimal) -> String {
        format!("{:.2}", amount.round_dp(2))
    }

    async fn access_token(&self) -> Result<String, GatewayError> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if cached.expires_at > Utc::now() {
                return Ok(cached.access_token.clone());
            }
        }

        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.config.base_url))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Auth(format!("{status}: {body}")));
        }

        let token = response.json::<TokenResponse>().await?;
        let expires_at =
            Utc::now() + Duration::seconds((token.expires_in - TOKEN_EXPIRY_MARGIN_SECS).max(0));

        let mut guard = self.token.write().await;
        *guard = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    async fn create_payment(
        &self,
        request: &GatewayPaymentRequest,
    ) -> Result<GatewayApproval, GatewayError> {
        let token = self.access_token().await?;

        let items: Vec<serde_json::Value> = request
            .items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "name": item.name,
                    "price": Self::format_amount(item.amount),
                    "currency": request.currency,
                    "quantity": 1,
                })
            })
            .collect();

        let payload = serde_json::json!({
            "intent": "sale",
            "payer": { "payment_method": "paypal" },
            "redirect_urls": {
                "return_url": self.config.return_url,
                "cancel_url": self.config.cancel_url,
            },
            "transactions": [{
                "amount": {
                    "total": Self::format_amount(request.total),
                    "currency": request.currency,
                },
                "description": request.description,
                "custom": request.appointment_id.to_string(),
                "item_list": { "items": items },
            }],
        });

        debug!(appointment_id = %request.appointment_id, "creating gateway payment");

        let response = self
            .http
            .post(format!("{}/v1/payments/payment", self.config.base_url))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                detail: format!("{status}: {body}"),
            });
        }

        let created = response.json::<CreatePaymentResponse>().await?;
        let approval_url = created
            .links
            .iter()
            .find(|link| link.rel == "approval_url")
            .map(|link| link.href.clone())
            .ok_or_else(|| GatewayError::Rejected {
                detail: "gateway response carried no approval_url link".into(),
            })?;

        Ok(GatewayApproval {
            payment_id: created.id,
            approval_url,
        })
    }

    async fn execute_payment(
        &self,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<GatewayExecution, GatewayError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{}/v1/payments/payment/{payment_id}/execute",
                self.config.base_url
            ))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "payer_id": payer_id }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                detail: format!("{status}: {body}"),
            });
        }

        let executed = response.json::<ExecutePaymentResponse>().await?;
        Ok(GatewayExecution {
            payment_id: executed.id,
            state: executed.state,
        })
    }
}
