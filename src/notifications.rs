// ABOUTME: Invoice notification seam invoked after successful bookings
// ABOUTME: Renders a plain-text invoice; delivery failures never roll back bookings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Invoice notifications
//!
//! Booking success triggers an invoice notification through the
//! [`InvoiceNotifier`] trait. Delivery is a secondary side effect: failures
//! are logged and swallowed by the caller, never surfaced to the customer or
//! allowed to undo the booking.

use crate::booking::pricing::PriceBreakdown;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Invoice payload assembled after a successful booking
#[derive(Debug, Clone)]
pub struct Invoice {
    /// Appointment the invoice covers
    pub appointment_id: Uuid,
    /// Recipient address
    pub customer_email: String,
    /// Recipient display name
    pub customer_name: String,
    /// Appointment start time
    pub start_time: DateTime<Utc>,
    /// Price breakdown at booking time
    pub breakdown: PriceBreakdown,
}

/// Notification delivery failure
#[derive(Debug, Error)]
#[error("invoice delivery failed: {reason}")]
pub struct NotifyError {
    /// Human-readable failure description
    pub reason: String,
}

/// Delivery seam for booking invoices
#[async_trait]
pub trait InvoiceNotifier: Send + Sync {
    /// Deliver an invoice to the customer
    async fn send_invoice(&self, invoice: &Invoice) -> Result<(), NotifyError>;
}

/// Render the invoice as plain text
#[must_use]
pub fn render_invoice(invoice: &Invoice) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Invoice for appointment {}\n{}\n{}\n\n",
        invoice.appointment_id,
        invoice.customer_name,
        invoice.start_time.format("%Y-%m-%d %H:%M UTC")
    ));

    for line in &invoice.breakdown.lines {
        out.push_str(&format!("  {:<30} {:>10}\n", line.name, line.price));
    }

    out.push_str(&format!(
        "\n  {:<30} {:>10}\n",
        "Subtotal", invoice.breakdown.base_total
    ));
    if let Some(code) = &invoice.breakdown.applied_coupon {
        out.push_str(&format!(
            "  {:<30} {:>10}\n",
            format!("Discount ({code})"),
            invoice.breakdown.total_discount
        ));
    }
    out.push_str(&format!(
        "  {:<30} {:>10}\n",
        "Total due", invoice.breakdown.final_total
    ));

    out
}

/// Notifier that records deliveries in the application log.
///
/// Stands in for a mail transport in deployments that have none configured.
pub struct LoggingNotifier;

#[async_trait]
impl InvoiceNotifier for LoggingNotifier {
    async fn send_invoice(&self, invoice: &Invoice) -> Result<(), NotifyError> {
        let rendered = render_invoice(invoice);
        info!(
            appointment_id = %invoice.appointment_id,
            recipient = %invoice.customer_email,
            "invoice generated\n{rendered}"
        );
        Ok(())
    }
}
