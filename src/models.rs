// ABOUTME: Core data models for the Amara Spa booking platform
// ABOUTME: Defines User, Service, Coupon, Appointment, StaffAssignment, and Payment types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # Data Models
//!
//! This module contains the core data structures used throughout the Amara
//! Spa server: accounts, the service catalog, coupons, appointments, staff
//! assignments, and payments.
//!
//! ## Design Principles
//!
//! - **Serializable**: all models support JSON serialization for the API
//! - **Type safe**: lifecycle states and roles are enums, not raw strings
//! - **Fixed point**: monetary values are `rust_decimal::Decimal`, never floats

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role controlling which operations an identity may perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative access to the catalog and all appointments
    Admin,
    /// May be assigned to services and appointments; sees own schedule
    Staff,
    /// Books appointments for themselves
    #[default]
    Customer,
}

impl UserRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Customer => "customer",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            "staff" => Self::Staff,
            _ => Self::Customer,
        }
    }

    /// Whether this role may manage the catalog and assignments
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may appear on the staff side of an appointment
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address, unique across accounts
    pub email: String,
    /// Bcrypt password hash; never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Account role
    pub role: UserRole,
    /// Whether the account may authenticate
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last time the account was seen
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new account with the given role
    #[must_use]
    pub fn new(email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            first_name: None,
            last_name: None,
            role,
            is_active: true,
            created_at: now,
            last_active: now,
        }
    }

    /// Display name assembled from first/last name, falling back to the email
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

/// A bookable catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Unique service identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Customer-facing description
    pub description: String,
    /// Treatment length in minutes
    pub duration_minutes: u32,
    /// Price in the configured currency
    pub price: Decimal,
    /// Optional catalog image
    pub image_url: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Create a new catalog entry
    #[must_use]
    pub fn new(name: String, description: String, duration_minutes: u32, price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            duration_minutes,
            price,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Percentage discount valid within a time window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique coupon identifier
    pub id: Uuid,
    /// Redemption code, unique across coupons
    pub code: String,
    /// Discount percentage; values above 100 clamp the total to zero
    pub discount_percent: Decimal,
    /// Start of the validity window, inclusive
    pub valid_from: DateTime<Utc>,
    /// End of the validity window, inclusive
    pub valid_until: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Create a new coupon
    #[must_use]
    pub fn new(
        code: String,
        discount_percent: Decimal,
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            discount_percent,
            valid_from,
            valid_until,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the coupon is active at the given instant
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.valid_from <= now && now <= self.valid_until
    }
}

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked, awaiting payment confirmation
    #[default]
    Pending,
    /// Payment captured; the slot is committed
    Confirmed,
    /// Canceled by the customer or staff
    Canceled,
    /// Service was performed
    Completed,
}

impl AppointmentStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Canceled => "canceled",
            Self::Completed => "completed",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => Self::Confirmed,
            "canceled" => Self::Canceled,
            "completed" => Self::Completed,
            _ => Self::Pending,
        }
    }

    /// Whether an appointment in this status occupies its staff slot.
    ///
    /// Pending appointments hold their slot while payment is captured,
    /// otherwise the slot could be sold twice between booking and payment.
    #[must_use]
    pub const fn holds_slot(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether a transition from this status to `next` is allowed
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Canceled)
                | (Self::Confirmed, Self::Completed | Self::Canceled)
        )
    }
}

/// A booked visit: customer, services, time slot, and lifecycle status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique appointment identifier
    pub id: Uuid,
    /// Customer the appointment belongs to
    pub customer_id: Uuid,
    /// Assigned staff member, if any
    pub staff_id: Option<Uuid>,
    /// Slot start time
    pub start_time: DateTime<Utc>,
    /// Total duration of the booked services, frozen at booking time
    pub duration_minutes: u32,
    /// Lifecycle status
    pub status: AppointmentStatus,
    /// Coupon applied at booking time, if any
    pub coupon_id: Option<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Booked service ids; order is not significant
    pub service_ids: Vec<Uuid>,
}

impl Appointment {
    /// Slot end time under half-open `[start, start+duration)` semantics
    #[must_use]
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + chrono::Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Qualification of a staff member for a service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAssignment {
    /// Unique assignment identifier
    pub id: Uuid,
    /// Staff member
    pub staff_id: Uuid,
    /// Service the staff member can perform
    pub service_id: Uuid,
    /// Preferred choice when auto-assigning staff for this service
    pub is_primary: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl StaffAssignment {
    /// Create a new staff/service pairing
    #[must_use]
    pub fn new(staff_id: Uuid, service_id: Uuid, is_primary: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            service_id,
            is_primary,
            created_at: Utc::now(),
        }
    }
}

/// Accepted payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
    Paypal,
}

impl PaymentMethod {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Mobile => "mobile",
            Self::Paypal => "paypal",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "card" => Self::Card,
            "mobile" => Self::Mobile,
            "paypal" => Self::Paypal,
            _ => Self::Cash,
        }
    }
}

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Recorded, awaiting settlement or manual confirmation
    #[default]
    Pending,
    /// Funds captured
    Completed,
    /// Settlement failed
    Failed,
}

impl PaymentStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// A recorded payment against an appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment identifier
    pub id: Uuid,
    /// Appointment this payment settles
    pub appointment_id: Uuid,
    /// User who paid
    pub payer_id: Uuid,
    /// Captured amount
    pub amount: Decimal,
    /// Payment method
    pub method: PaymentMethod,
    /// Payment status
    pub status: PaymentStatus,
    /// External gateway payment identifier, when the gateway flow is used
    pub gateway_payment_id: Option<String>,
    /// When the transaction was recorded
    pub transaction_date: DateTime<Utc>,
}

impl Payment {
    /// Record a new payment
    #[must_use]
    pub fn new(
        appointment_id: Uuid,
        payer_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        status: PaymentStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            appointment_id,
            payer_id,
            amount,
            method,
            status,
            gateway_payment_id: None,
            transaction_date: Utc::now(),
        }
    }
}
