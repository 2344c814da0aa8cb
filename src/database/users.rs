// ABOUTME: User management database operations
// ABOUTME: Handles account CRUD, profile updates, and the token revocation list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

use super::{parse_datetime, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

impl Database {
    /// Create users and revoked-token tables
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                role TEXT NOT NULL DEFAULT 'customer' CHECK (role IN ('admin', 'staff', 'customer')),
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                last_active TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS revoked_tokens (
                token_digest TEXT PRIMARY KEY,
                expires_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create a new user account
    ///
    /// # Errors
    ///
    /// Returns a conflict error if the email is already registered.
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        if self.get_user_by_email(&user.email).await?.is_some() {
            return Err(
                AppError::already_exists(format!("Email {} is already registered", user.email))
                    .with_resource_id(user.email.clone()),
            );
        }

        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, first_name, last_name, role, is_active, created_at, last_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at.to_rfc3339())
        .bind(user.last_active.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(user.id)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Get user by email address
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Update the user's last-active timestamp
    pub async fn update_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = ?1 WHERE id = ?2")
            .bind(Utc::now().to_rfc3339())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update the user's first and last name
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET first_name = ?1, last_name = ?2 WHERE id = ?3")
            .bind(first_name)
            .bind(last_name)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id}")));
        }
        Ok(())
    }

    /// Replace the user's password hash
    pub async fn update_user_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
            .bind(password_hash)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id}")));
        }
        Ok(())
    }

    /// Record a revoked token digest until its natural expiry
    pub async fn revoke_token(&self, token_digest: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO revoked_tokens (token_digest, expires_at) VALUES (?1, ?2)",
        )
        .bind(token_digest)
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        // Expired digests are dead weight; sweep them opportunistically
        sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?1")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Whether a token digest is on the revocation list
    pub async fn is_token_revoked(&self, token_digest: &str) -> AppResult<bool> {
        let row = sqlx::query("SELECT token_digest FROM revoked_tokens WHERE token_digest = ?1")
            .bind(token_digest)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;
    let last_active: String = row.try_get("last_active")?;
    let role: String = row.try_get("role")?;

    Ok(User {
        id: parse_uuid(&id, "users.id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        role: UserRole::parse(&role),
        is_active: row.try_get("is_active")?,
        created_at: parse_datetime(&created_at, "users.created_at")?,
        last_active: parse_datetime(&last_active, "users.last_active")?,
    })
}
