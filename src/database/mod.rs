// ABOUTME: Database access layer over SQLite with idempotent schema migration
// ABOUTME: Splits domain operations into users, catalog, appointments, and payments modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # Database Layer
//!
//! SQLite-backed persistence for the Amara Spa server. The schema is created
//! by an idempotent [`Database::migrate`] pass; rich types are stored as TEXT
//! (UUIDs, RFC 3339 timestamps, canonical decimal strings) the way the rest
//! of the codebase expects them.

mod appointments;
mod catalog;
mod payments;
mod users;

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// SQLite-backed database handle; cheap to clone
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or the
    /// schema migration fails.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains(":memory:")
            && !database_url.contains('?')
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        // An in-memory database lives and dies with its connection: pin the
        // pool to one connection that never expires so every caller sees the
        // same schema.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(&connection_options)
                .await
        } else {
            SqlitePoolOptions::new()
                .acquire_timeout(Duration::from_secs(5))
                .connect(&connection_options)
                .await
        }
        .map_err(|e| AppError::database(format!("failed to connect: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations to set up the schema
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails.
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_catalog().await?;
        self.migrate_appointments().await?;
        self.migrate_payments().await?;
        Ok(())
    }

    /// Access the underlying pool (health checks, tests)
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Lightweight connectivity probe
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer a trivial query.
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// ── Column decoding helpers ─────────────────────────────────────────────
// SQLite stores rich types as TEXT; these keep the parsing noise out of the
// row-mapping code and attach the offending column to the error.

pub(crate) fn parse_uuid(value: &str, column: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::database(format!("invalid UUID in column {column}: {e}")))
}

pub(crate) fn parse_datetime(value: &str, column: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("invalid timestamp in column {column}: {e}")))
}

pub(crate) fn parse_decimal(value: &str, column: &str) -> AppResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| AppError::database(format!("invalid decimal in column {column}: {e}")))
}
