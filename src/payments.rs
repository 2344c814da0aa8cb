// ABOUTME: Payment capture orchestration for cash and external gateway flows
// ABOUTME: Enforces the itemized-sum guard and drives appointment status transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # Payment Capture
//!
//! Two flows, both idempotent at the appointment-status level:
//!
//! - **Cash** records a pending payment row and leaves the appointment
//!   pending, awaiting manual confirmation at the desk.
//! - **Gateway** creates an itemized external payment intent whose line sum
//!   must equal the computed final total exactly; the execute step finalizes
//!   with the payer id, records the completed payment, and confirms the
//!   appointment. Gateway failures surface verbatim and mutate nothing.

use crate::booking::authorize_appointment_access;
use crate::booking::pricing::{price_appointment, PriceBreakdown};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::gateway::{
    GatewayApproval, GatewayExecution, GatewayPaymentRequest, PaymentGateway, PaymentItem,
};
use crate::models::{
    Appointment, AppointmentStatus, Payment, PaymentMethod, PaymentStatus, UserRole,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Result of recording a cash payment
#[derive(Debug, Clone, serde::Serialize)]
pub struct CashPaymentReceipt {
    /// Recorded payment id
    pub payment_id: Uuid,
    /// Captured amount
    pub amount: Decimal,
    /// Always `cash`
    pub method: PaymentMethod,
    /// Appointment status after recording
    pub appointment_status: AppointmentStatus,
}

/// Orchestrates payment capture against appointments
pub struct PaymentProcessor {
    database: Arc<Database>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl PaymentProcessor {
    /// Create a payment processor
    #[must_use]
    pub fn new(database: Arc<Database>, gateway: Arc<dyn PaymentGateway>, currency: String) -> Self {
        Self {
            database,
            gateway,
            currency,
        }
    }

    /// Record a cash payment for an appointment.
    ///
    /// The payment row is created with status `pending` (awaiting manual
    /// confirmation) and the appointment stays pending.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown appointment, a permission
    /// error when the actor may not pay for it, and a validation error when
    /// the appointment is canceled or completed.
    pub async fn cash_payment(
        &self,
        appointment_id: Uuid,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> AppResult<CashPaymentReceipt> {
        let (appointment, breakdown) = self.payable_appointment(appointment_id, actor_id, actor_role).await?;

        let payment = Payment::new(
            appointment.id,
            actor_id,
            breakdown.final_total,
            PaymentMethod::Cash,
            PaymentStatus::Pending,
        );
        self.database.create_payment(&payment).await?;

        info!(
            appointment_id = %appointment.id,
            payment_id = %payment.id,
            amount = %payment.amount,
            "cash payment recorded"
        );

        Ok(CashPaymentReceipt {
            payment_id: payment.id,
            amount: payment.amount,
            method: PaymentMethod::Cash,
            appointment_status: appointment.status,
        })
    }

    /// Create an external gateway payment for an appointment.
    ///
    /// When `items` is absent, lines default to one per service at base
    /// price plus a negative discount line when a coupon applies. The line
    /// sum must equal the computed final total exactly; a mismatch aborts
    /// before the gateway is contacted.
    ///
    /// # Errors
    ///
    /// Returns a validation error on an itemized-sum mismatch and an
    /// external-service error, verbatim, when the gateway rejects the
    /// create step.
    pub async fn create_gateway_payment(
        &self,
        appointment_id: Uuid,
        actor_id: Uuid,
        actor_role: UserRole,
        items: Option<Vec<PaymentItem>>,
    ) -> AppResult<GatewayApproval> {
        let (appointment, breakdown) = self.payable_appointment(appointment_id, actor_id, actor_role).await?;

        let items = items.unwrap_or_else(|| Self::default_items(&breakdown));

        let item_total: Decimal = items.iter().map(|item| item.amount).sum();
        if item_total != breakdown.final_total {
            return Err(AppError::invalid_input(format!(
                "Item prices ({item_total}) do not match the calculated total ({})",
                breakdown.final_total
            ))
            .with_details(serde_json::json!({
                "item_total": item_total.to_string(),
                "calculated_total": breakdown.final_total.to_string(),
            })));
        }

        let request = GatewayPaymentRequest {
            appointment_id: appointment.id,
            description: format!("Payment for appointment {}", appointment.id),
            currency: self.currency.clone(),
            total: breakdown.final_total,
            items,
        };

        let approval = self
            .gateway
            .create_payment(&request)
            .await
            .map_err(|e| AppError::external_service("payment gateway", e.to_string()))?;

        let mut payment = Payment::new(
            appointment.id,
            actor_id,
            breakdown.final_total,
            PaymentMethod::Paypal,
            PaymentStatus::Pending,
        );
        payment.gateway_payment_id = Some(approval.payment_id.clone());
        self.database.create_payment(&payment).await?;

        info!(
            appointment_id = %appointment.id,
            gateway_payment_id = %approval.payment_id,
            "gateway payment created, awaiting approval"
        );

        Ok(approval)
    }

    /// Execute an approved gateway payment.
    ///
    /// Gateway success marks the payment completed and the appointment
    /// confirmed. Re-executing an already completed payment is a no-op that
    /// returns the settled state. Gateway failure is surfaced verbatim and
    /// mutates neither record.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown gateway payment id and an
    /// external-service error when the gateway rejects execution.
    pub async fn execute_gateway_payment(
        &self,
        gateway_payment_id: &str,
        payer_id: &str,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> AppResult<GatewayExecution> {
        let payment = self
            .database
            .get_payment_by_gateway_id(gateway_payment_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Gateway payment {gateway_payment_id}"))
            })?;

        let appointment = self
            .database
            .get_appointment(payment.appointment_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Appointment {}", payment.appointment_id))
            })?;
        authorize_appointment_access(&appointment, actor_id, actor_role)?;

        if payment.status == PaymentStatus::Completed {
            return Ok(GatewayExecution {
                payment_id: gateway_payment_id.to_string(),
                state: "approved".into(),
            });
        }

        let execution = self
            .gateway
            .execute_payment(gateway_payment_id, payer_id)
            .await
            .map_err(|e| AppError::external_service("payment gateway", e.to_string()))?;

        self.database
            .update_payment_status(payment.id, PaymentStatus::Completed)
            .await?;
        if appointment.status == AppointmentStatus::Pending {
            self.database
                .update_appointment_status(appointment.id, AppointmentStatus::Confirmed)
                .await?;
        }

        info!(
            appointment_id = %appointment.id,
            gateway_payment_id = %gateway_payment_id,
            state = %execution.state,
            "gateway payment executed, appointment confirmed"
        );

        Ok(execution)
    }

    /// Default itemization: one line per service at base price, plus a
    /// negative discount line when a coupon applied
    fn default_items(breakdown: &PriceBreakdown) -> Vec<PaymentItem> {
        let mut items: Vec<PaymentItem> = breakdown
            .lines
            .iter()
            .map(|line| PaymentItem {
                name: line.name.clone(),
                amount: line.price,
            })
            .collect();

        if breakdown.total_discount > Decimal::ZERO {
            let code = breakdown
                .applied_coupon
                .clone()
                .unwrap_or_else(|| "discount".into());
            items.push(PaymentItem {
                name: format!("Discount ({code})"),
                amount: -breakdown.total_discount,
            });
        }

        items
    }

    /// Load an appointment, authorize the actor, verify it can accept a
    /// payment, and price it at the current instant
    async fn payable_appointment(
        &self,
        appointment_id: Uuid,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> AppResult<(Appointment, PriceBreakdown)> {
        let appointment = self
            .database
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Appointment {appointment_id}")))?;

        authorize_appointment_access(&appointment, actor_id, actor_role)?;

        match appointment.status {
            AppointmentStatus::Pending => {}
            AppointmentStatus::Confirmed => {
                return Err(AppError::invalid_input(
                    "Appointment is already confirmed and paid",
                ));
            }
            AppointmentStatus::Canceled | AppointmentStatus::Completed => {
                return Err(AppError::invalid_input(format!(
                    "Cannot take payment for a {} appointment",
                    appointment.status.as_str()
                )));
            }
        }

        let services = self.database.get_services_by_ids(&appointment.service_ids).await?;
        let coupon = match appointment.coupon_id {
            Some(coupon_id) => self.database.get_coupon(coupon_id).await?,
            None => None,
        };
        let breakdown = price_appointment(&services, coupon.as_ref(), Utc::now());

        Ok((appointment, breakdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::pricing::PriceLine;
    use std::str::FromStr;

    #[test]
    fn test_default_items_include_discount_line() {
        let breakdown = PriceBreakdown {
            lines: vec![
                PriceLine {
                    service_id: Uuid::new_v4(),
                    name: "Massage".into(),
                    price: Decimal::from_str("40.00").unwrap(),
                },
                PriceLine {
                    service_id: Uuid::new_v4(),
                    name: "Facial".into(),
                    price: Decimal::from_str("10.00").unwrap(),
                },
            ],
            base_total: Decimal::from_str("50.00").unwrap(),
            total_discount: Decimal::from_str("5.00").unwrap(),
            final_total: Decimal::from_str("45.00").unwrap(),
            applied_coupon: Some("TEN".into()),
        };

        let items = PaymentProcessor::default_items(&breakdown);
        let sum: Decimal = items.iter().map(|i| i.amount).sum();

        assert_eq!(items.len(), 3);
        assert_eq!(sum, breakdown.final_total);
        assert!(items[2].name.contains("TEN"));
        assert!(items[2].amount < Decimal::ZERO);
    }

    #[test]
    fn test_default_items_without_discount() {
        let breakdown = PriceBreakdown {
            lines: vec![PriceLine {
                service_id: Uuid::new_v4(),
                name: "Massage".into(),
                price: Decimal::from_str("50.00").unwrap(),
            }],
            base_total: Decimal::from_str("50.00").unwrap(),
            total_discount: Decimal::ZERO,
            final_total: Decimal::from_str("50.00").unwrap(),
            applied_coupon: None,
        };

        let items = PaymentProcessor::default_items(&breakdown);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount, breakdown.final_total);
    }
}
