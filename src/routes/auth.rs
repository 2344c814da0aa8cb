// ABOUTME: Authentication route handlers for registration, login, and account management
// ABOUTME: Provides REST endpoints for user accounts, Google sign-in, and logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Authentication routes
//!
//! Registration, login, Google sign-in, logout (token revocation), and
//! profile management. Handlers are thin; credential and token work lives
//! in [`crate::auth`] and [`crate::middleware::auth`].

use crate::{
    auth::{hash_password, is_strong_enough, verify_password},
    constants::error_messages,
    errors::{AppError, AppResult},
    models::{User, UserRole},
    resources::ServerResources,
    routes::{created, ok, ok_empty},
};
use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Google's ID-token verification endpoint
const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleSignInRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// User payload embedded in auth responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in_hours: i64,
    pub user: UserInfo,
}

/// Claims returned by Google's tokeninfo endpoint; unused fields ignored
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    email: String,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/google", post(Self::handle_google_sign_in))
            .route("/api/auth/logout", post(Self::handle_logout))
            .route("/api/auth/me", get(Self::handle_me))
            .route("/api/auth/profile", put(Self::handle_update_profile))
            .route("/api/auth/password", put(Self::handle_change_password))
            .with_state(resources)
    }

    /// Basic email shape check; full verification is delivery's problem
    fn is_valid_email(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        if !Self::is_valid_email(&body.email) {
            return Err(AppError::invalid_input(error_messages::INVALID_EMAIL_FORMAT));
        }
        if body.password != body.password_confirmation {
            return Err(AppError::invalid_input(error_messages::PASSWORD_MISMATCH));
        }
        if !is_strong_enough(&body.password) {
            return Err(AppError::invalid_input(error_messages::PASSWORD_TOO_SHORT));
        }

        let password_hash = hash_password(&body.password)?;
        let mut user = User::new(body.email.clone(), password_hash, UserRole::Customer);
        user.first_name = body.first_name;
        user.last_name = body.last_name;

        resources.database.create_user(&user).await?;
        info!(user_id = %user.id, "user registered");

        Ok(created(
            "User registered successfully",
            UserInfo::from(&user),
        ))
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .get_user_by_email(&body.email)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::auth_invalid(error_messages::INVALID_CREDENTIALS))?;

        if !verify_password(&body.password, &user.password_hash)? {
            warn!(email = %body.email, "failed login attempt");
            return Err(AppError::auth_invalid(error_messages::INVALID_CREDENTIALS));
        }

        resources.database.update_last_active(user.id).await?;
        let token = resources.auth_manager.generate_token(&user)?;

        Ok(ok(
            "Login successful",
            LoginResponse {
                access_token: token,
                expires_in_hours: resources.auth_manager.token_expiry_hours(),
                user: UserInfo::from(&user),
            },
        ))
    }

    /// Handle POST /api/auth/google - verify a Google ID token, provisioning
    /// a customer account on first sight
    async fn handle_google_sign_in(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<GoogleSignInRequest>,
    ) -> Result<Response, AppError> {
        let token_info = Self::verify_google_token(&body.token).await?;

        let user = match resources
            .database
            .get_user_by_email(&token_info.email)
            .await?
        {
            Some(user) => user,
            None => {
                // No local password for Google accounts; store a hash of
                // random bytes so password login can never match
                let placeholder =
                    hash_password(&hex::encode(crate::auth::generate_jwt_secret()))?;
                let mut user = User::new(token_info.email.clone(), placeholder, UserRole::Customer);
                user.first_name = token_info.given_name;
                user.last_name = token_info.family_name;
                resources.database.create_user(&user).await?;
                info!(user_id = %user.id, "user provisioned via Google sign-in");
                user
            }
        };

        if !user.is_active {
            return Err(AppError::auth_invalid("Account is deactivated"));
        }

        resources.database.update_last_active(user.id).await?;
        let token = resources.auth_manager.generate_token(&user)?;

        Ok(ok(
            "Google sign-in successful",
            LoginResponse {
                access_token: token,
                expires_in_hours: resources.auth_manager.token_expiry_hours(),
                user: UserInfo::from(&user),
            },
        ))
    }

    /// Handle POST /api/auth/logout - revoke the presented token
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let token = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(AppError::auth_required)?;

        resources.auth_guard.revoke(token).await?;
        Ok(ok_empty("Logout successful"))
    }

    /// Handle GET /api/auth/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;
        let user = resources
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", auth.user_id)))?;

        Ok(ok("User retrieved successfully", UserInfo::from(&user)))
    }

    /// Handle PUT /api/auth/profile
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<UpdateProfileRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;

        if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
            return Err(AppError::invalid_input("First and last name are required"));
        }

        resources
            .database
            .update_user_profile(auth.user_id, body.first_name.trim(), body.last_name.trim())
            .await?;

        let user = resources
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", auth.user_id)))?;

        Ok(ok(
            "User information updated successfully",
            UserInfo::from(&user),
        ))
    }

    /// Handle PUT /api/auth/password
    async fn handle_change_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ChangePasswordRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_guard.authenticate(&headers).await?;

        if body.old_password == body.new_password {
            return Err(AppError::invalid_input(
                "New password cannot be the same as the old password",
            ));
        }
        if !is_strong_enough(&body.new_password) {
            return Err(AppError::invalid_input(error_messages::PASSWORD_TOO_SHORT));
        }

        let user = resources
            .database
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", auth.user_id)))?;

        if !verify_password(&body.old_password, &user.password_hash)? {
            return Err(AppError::invalid_input("The old password is incorrect"));
        }

        let new_hash = hash_password(&body.new_password)?;
        resources
            .database
            .update_user_password(auth.user_id, &new_hash)
            .await?;

        Ok(ok_empty("Password changed successfully"))
    }

    /// Verify a Google ID token against the tokeninfo endpoint
    async fn verify_google_token(token: &str) -> AppResult<GoogleTokenInfo> {
        let response = reqwest::Client::new()
            .get(GOOGLE_TOKENINFO_URL)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| AppError::external_service("google", e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::auth_invalid(
                "Invalid token or unable to verify token",
            ));
        }

        response
            .json::<GoogleTokenInfo>()
            .await
            .map_err(|e| AppError::external_service("google", e.to_string()))
    }
}
