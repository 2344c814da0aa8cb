// ABOUTME: Request authentication middleware for bearer-token protected routes
// ABOUTME: Validates JWTs, consults the revocation list, and loads the caller's role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

use crate::auth::{AuthManager, JwtValidationError};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::UserRole;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// The authenticated caller attached to a request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Caller's user id
    pub user_id: Uuid,
    /// Caller's email
    pub email: String,
    /// Caller's role, loaded from the account record (not the token) so a
    /// role change takes effect without re-issuing tokens
    pub role: UserRole,
}

/// SHA-256 digest of a token, hex encoded; raw tokens never hit the database
#[must_use]
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Middleware for bearer-token authentication
#[derive(Clone)]
pub struct AuthGuard {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl AuthGuard {
    /// Create a new auth guard
    #[must_use]
    pub fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the Authorization header is missing or not a
    /// bearer token, the JWT fails validation, the token was revoked by
    /// logout, or the account no longer exists or is inactive.
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthenticatedUser> {
        let token = Self::bearer_token(headers)?;
        self.authenticate_token(token).await
    }

    /// Authenticate a raw bearer token
    ///
    /// # Errors
    ///
    /// See [`AuthGuard::authenticate`].
    pub async fn authenticate_token(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let claims = self.auth_manager.validate_token(token).map_err(|e| match e {
            JwtValidationError::TokenExpired { .. } => AppError::auth_expired(),
            other => AppError::auth_invalid(other.to_string()),
        })?;

        if self.database.is_token_revoked(&token_digest(token)).await? {
            return Err(AppError::auth_invalid(
                JwtValidationError::TokenRevoked.to_string(),
            ));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a valid user id"))?;

        let user = self
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Account no longer exists"))?;

        if !user.is_active {
            return Err(AppError::auth_invalid("Account is deactivated"));
        }

        debug!(user_id = %user.id, role = user.role.as_str(), "request authenticated");

        self.database.update_last_active(user.id).await?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }

    /// Revoke the presented token until its natural expiry
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not validate or the revocation
    /// list cannot be written.
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        let claims = self
            .auth_manager
            .validate_token(token)
            .map_err(|e| AppError::auth_invalid(e.to_string()))?;

        self.database
            .revoke_token(&token_digest(token), claims.expires_at())
            .await
    }

    fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
        let value = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must be a bearer token"))
    }
}
