// ABOUTME: Payment database operations
// ABOUTME: Records payment rows and correlates gateway payments by external id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

use super::{parse_datetime, parse_decimal, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Payment, PaymentMethod, PaymentStatus};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

impl Database {
    /// Create the payments table
    pub(super) async fn migrate_payments(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS payments (
                id TEXT PRIMARY KEY,
                appointment_id TEXT NOT NULL REFERENCES appointments(id),
                payer_id TEXT NOT NULL REFERENCES users(id),
                amount TEXT NOT NULL,
                method TEXT NOT NULL CHECK (method IN ('cash', 'card', 'mobile', 'paypal')),
                status TEXT NOT NULL CHECK (status IN ('pending', 'completed', 'failed')),
                gateway_payment_id TEXT UNIQUE,
                transaction_date TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_payments_appointment ON payments(appointment_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record a payment
    pub async fn create_payment(&self, payment: &Payment) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO payments (id, appointment_id, payer_id, amount, method, status, gateway_payment_id, transaction_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(payment.id.to_string())
        .bind(payment.appointment_id.to_string())
        .bind(payment.payer_id.to_string())
        .bind(payment.amount.to_string())
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.gateway_payment_id)
        .bind(payment.transaction_date.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(payment.id)
    }

    /// Look up the payment created for a gateway payment id
    pub async fn get_payment_by_gateway_id(
        &self,
        gateway_payment_id: &str,
    ) -> AppResult<Option<Payment>> {
        let row = sqlx::query("SELECT * FROM payments WHERE gateway_payment_id = ?1")
            .bind(gateway_payment_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_payment(&r)).transpose()
    }

    /// Set a payment's status
    pub async fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE payments SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(payment_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Payment {payment_id}")));
        }
        Ok(())
    }

    /// All payments recorded against an appointment, newest first
    pub async fn list_payments_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> AppResult<Vec<Payment>> {
        let rows = sqlx::query(
            "SELECT * FROM payments WHERE appointment_id = ?1 ORDER BY transaction_date DESC",
        )
        .bind(appointment_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_payment).collect()
    }
}

fn row_to_payment(row: &SqliteRow) -> AppResult<Payment> {
    let id: String = row.try_get("id")?;
    let appointment_id: String = row.try_get("appointment_id")?;
    let payer_id: String = row.try_get("payer_id")?;
    let amount: String = row.try_get("amount")?;
    let method: String = row.try_get("method")?;
    let status: String = row.try_get("status")?;
    let transaction_date: String = row.try_get("transaction_date")?;

    Ok(Payment {
        id: parse_uuid(&id, "payments.id")?,
        appointment_id: parse_uuid(&appointment_id, "payments.appointment_id")?,
        payer_id: parse_uuid(&payer_id, "payments.payer_id")?,
        amount: parse_decimal(&amount, "payments.amount")?,
        method: PaymentMethod::parse(&method),
        status: PaymentStatus::parse(&status),
        gateway_payment_id: row.try_get("gateway_payment_id")?,
        transaction_date: parse_datetime(&transaction_date, "payments.transaction_date")?,
    })
}
