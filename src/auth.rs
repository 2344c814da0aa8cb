// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Handles token generation, validation, and credential verification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # Authentication and Session Management
//!
//! This module provides JWT-based authentication for the Amara Spa server.
//! Tokens are signed with HS256 using a process-wide secret; passwords are
//! hashed with bcrypt.

use crate::constants::limits::MIN_PASSWORD_LENGTH;
use crate::models::{User, UserRole};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Length of the generated JWT signing secret in bytes
const JWT_SECRET_LEN: usize = 64;

/// Generate a random JWT signing secret
#[must_use]
pub fn generate_jwt_secret() -> [u8; JWT_SECRET_LEN] {
    let mut secret = [0u8; JWT_SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

/// Hash a password for storage
///
/// # Errors
///
/// Returns an error if bcrypt hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("failed to hash password")
}

/// Verify a password against a stored hash
///
/// # Errors
///
/// Returns an error if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("failed to verify password")
}

/// Check password strength for registration and password changes
#[must_use]
pub fn is_strong_enough(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LENGTH
}

/// JWT validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper JWT format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
    /// Token was revoked by logout
    TokenRevoked,
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let expired_for = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "JWT token expired {} minutes ago at {}",
                    expired_for.num_minutes(),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
            Self::TokenRevoked => write!(f, "JWT token has been revoked"),
        }
    }
}

impl std::error::Error for JwtValidationError {}

/// JWT claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// User email
    pub email: String,
    /// Account role at issuance time
    pub role: UserRole,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Expiry as a UTC timestamp
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Issues and validates user session tokens
pub struct AuthManager {
    jwt_secret: Vec<u8>,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new auth manager with the given signing secret
    #[must_use]
    pub fn new(jwt_secret: Vec<u8>, token_expiry_hours: i64) -> Self {
        Self {
            jwt_secret,
            token_expiry_hours,
        }
    }

    /// Generate a session token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(&self.jwt_secret);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
            .context("failed to encode JWT")?;

        Ok(token)
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is expired, malformed,
    /// or carries an invalid signature.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let decoding_key = DecodingKey::from_secret(&self.jwt_secret);

        // Expiry is checked by hand after signature verification so the
        // error can say when the token expired, not just that it did.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| Self::convert_jwt_error(&e))?
            .claims;

        let now = Utc::now();
        if claims.exp < now.timestamp() {
            return Err(JwtValidationError::TokenExpired {
                expired_at: claims.expires_at(),
                current_time: now,
            });
        }

        Ok(claims)
    }

    /// Token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "signature verification failed".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "token structure is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("invalid base64 encoding: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("invalid claims payload: {json_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: e.to_string(),
            },
        }
    }
}
