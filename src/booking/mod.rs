// ABOUTME: Booking orchestration: availability, pricing, auto-assignment, status transitions
// ABOUTME: Serializes per-staff booking through advisory locks to prevent double-booking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # Booking Service
//!
//! The booking flow: a request selects services, the coupon is resolved, a
//! staff member is resolved (explicitly requested or auto-assigned), the
//! availability check validates the staff member's slot, the appointment is
//! persisted, pricing is computed, and the invoice notification fires.
//!
//! The availability check and the insert run inside one database
//! transaction, serialized per staff member by an advisory lock, so two
//! concurrent requests for the same slot cannot both pass the check.

pub mod assignment;
pub mod availability;
pub mod pricing;

use crate::constants::{error_messages, limits};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Appointment, AppointmentStatus, Coupon, Service, UserRole};
use crate::notifications::{Invoice, InvoiceNotifier};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pricing::{price_appointment, total_duration_minutes, PriceBreakdown};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Roles eligible to appear on the staff side of an appointment
const STAFF_ROLES: [UserRole; 2] = [UserRole::Staff, UserRole::Admin];

/// A booking request, validated and priced by [`BookingService::book`]
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    /// Customer making the booking
    pub customer_id: Uuid,
    /// Selected services; at least one
    pub service_ids: Vec<Uuid>,
    /// Requested slot start
    pub start_time: DateTime<Utc>,
    /// Explicitly requested staff member; auto-assigned when absent
    pub staff_id: Option<Uuid>,
    /// Coupon code to apply
    pub coupon_code: Option<String>,
}

/// Result of a successful booking
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    /// The persisted appointment
    pub appointment: Appointment,
    /// Price breakdown at booking time
    pub breakdown: PriceBreakdown,
}

/// Authorize access to an appointment: the owning customer, any staff
/// member, or an admin.
pub fn authorize_appointment_access(
    appointment: &Appointment,
    actor_id: Uuid,
    actor_role: UserRole,
) -> AppResult<()> {
    if appointment.customer_id == actor_id || actor_role.is_staff() {
        Ok(())
    } else {
        Err(
            AppError::permission_denied("You may only act on your own appointments")
                .with_user_id(actor_id)
                .with_resource_id(appointment.id.to_string()),
        )
    }
}

/// Orchestrates appointment creation and lifecycle transitions
pub struct BookingService {
    database: Arc<Database>,
    notifier: Arc<dyn InvoiceNotifier>,
    // Advisory per-staff locks; entries are tiny and staff counts are small,
    // so the map is never swept
    staff_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl BookingService {
    /// Create a booking service
    #[must_use]
    pub fn new(database: Arc<Database>, notifier: Arc<dyn InvoiceNotifier>) -> Self {
        Self {
            database,
            notifier,
            staff_locks: DashMap::new(),
        }
    }

    /// Book an appointment.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or unknown service set, an
    /// unknown or inactive coupon, or an unknown/ineligible staff member; a
    /// conflict error when the staff member's slot is occupied. Nothing is
    /// persisted on any error path.
    pub async fn book(&self, request: BookingRequest) -> AppResult<BookingOutcome> {
        let now = Utc::now();

        let services = self.resolve_services(&request.service_ids).await?;
        let coupon = match &request.coupon_code {
            Some(code) => Some(self.resolve_active_coupon(code, now).await?),
            None => None,
        };

        let customer = self
            .database
            .get_user(request.customer_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", request.customer_id)))?;

        let staff_id = match request.staff_id {
            Some(staff_id) => {
                self.verify_staff(staff_id).await?;
                Some(staff_id)
            }
            None => {
                let candidates = self
                    .database
                    .assignments_for_services(&request.service_ids, &STAFF_ROLES)
                    .await?;
                let selected = assignment::select_staff(&candidates);
                if selected.is_none() {
                    debug!(
                        customer_id = %request.customer_id,
                        "no qualified staff for booked services; creating unassigned"
                    );
                }
                selected
            }
        };

        let appointment = Appointment {
            id: Uuid::new_v4(),
            customer_id: request.customer_id,
            staff_id,
            start_time: request.start_time,
            duration_minutes: total_duration_minutes(&services),
            status: AppointmentStatus::Pending,
            coupon_id: coupon.as_ref().map(|c| c.id),
            created_at: now,
            service_ids: request.service_ids.clone(),
        };

        // The lock spans the conflict scan and the insert; without it two
        // requests could both pass the scan and double-book the slot.
        match staff_id {
            Some(staff_id) => {
                let lock = self.staff_lock(staff_id);
                let _guard = lock.lock().await;
                self.database.create_appointment_checked(&appointment).await?;
            }
            None => {
                self.database.create_appointment_checked(&appointment).await?;
            }
        }

        let breakdown = price_appointment(&services, coupon.as_ref(), now);

        let invoice = Invoice {
            appointment_id: appointment.id,
            customer_email: customer.email.clone(),
            customer_name: customer.display_name(),
            start_time: appointment.start_time,
            breakdown: breakdown.clone(),
        };
        if let Err(e) = self.notifier.send_invoice(&invoice).await {
            // Secondary side effect: the booking stands regardless
            warn!(appointment_id = %appointment.id, error = %e, "invoice notification failed");
        }

        Ok(BookingOutcome {
            appointment,
            breakdown,
        })
    }

    /// Price an existing appointment at the current instant
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown appointment.
    pub async fn price_existing(&self, appointment_id: Uuid) -> AppResult<PriceBreakdown> {
        let appointment = self.get_appointment(appointment_id).await?;
        let services = self.database.get_services_by_ids(&appointment.service_ids).await?;
        let coupon = match appointment.coupon_id {
            Some(coupon_id) => self.database.get_coupon(coupon_id).await?,
            None => None,
        };

        Ok(price_appointment(&services, coupon.as_ref(), Utc::now()))
    }

    /// Fetch an appointment or fail with not-found
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown appointment.
    pub async fn get_appointment(&self, appointment_id: Uuid) -> AppResult<Appointment> {
        self.database
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Appointment {appointment_id}")))
    }

    /// Transition an appointment's lifecycle status.
    ///
    /// Customers may cancel their own appointments; marking completed or
    /// confirmed requires a staff or admin actor.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a transition the lifecycle matrix
    /// forbids and a permission error for an unauthorized actor.
    pub async fn transition_status(
        &self,
        appointment_id: Uuid,
        next: AppointmentStatus,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> AppResult<Appointment> {
        let appointment = self.get_appointment(appointment_id).await?;
        authorize_appointment_access(&appointment, actor_id, actor_role)?;

        // Customers can only back out of their own bookings
        if !actor_role.is_staff() && next != AppointmentStatus::Canceled {
            return Err(AppError::permission_denied(
                "Only staff may confirm or complete appointments",
            )
            .with_user_id(actor_id));
        }

        if !appointment.status.can_transition_to(next) {
            return Err(AppError::invalid_input(format!(
                "Cannot transition appointment from {} to {}",
                appointment.status.as_str(),
                next.as_str()
            )));
        }

        self.database
            .update_appointment_status(appointment_id, next)
            .await?;

        let mut updated = appointment;
        updated.status = next;
        Ok(updated)
    }

    /// All appointments for a customer, authorization already applied by the caller
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Appointment>> {
        self.database.list_appointments_for_customer(customer_id).await
    }

    async fn resolve_services(&self, service_ids: &[Uuid]) -> AppResult<Vec<Service>> {
        if service_ids.is_empty() {
            return Err(AppError::invalid_input(
                "An appointment requires at least one service",
            ));
        }
        if service_ids.len() > limits::MAX_SERVICES_PER_APPOINTMENT {
            return Err(AppError::invalid_input(format!(
                "An appointment may include at most {} services",
                limits::MAX_SERVICES_PER_APPOINTMENT
            )));
        }

        let services = self.database.get_services_by_ids(service_ids).await?;
        if services.len() != service_ids.len() {
            let found: Vec<Uuid> = services.iter().map(|s| s.id).collect();
            let missing: Vec<String> = service_ids
                .iter()
                .filter(|id| !found.contains(id))
                .map(ToString::to_string)
                .collect();
            return Err(AppError::invalid_input("Invalid services selected")
                .with_details(serde_json::json!({ "unknown_service_ids": missing })));
        }

        Ok(services)
    }

    async fn resolve_active_coupon(&self, code: &str, now: DateTime<Utc>) -> AppResult<Coupon> {
        let coupon = self
            .database
            .get_coupon_by_code(code)
            .await?
            .filter(|coupon| coupon.is_active(now))
            .ok_or_else(|| {
                AppError::invalid_input(error_messages::INVALID_OR_EXPIRED_COUPON)
                    .with_resource_id(code.to_string())
            })?;
        Ok(coupon)
    }

    async fn verify_staff(&self, staff_id: Uuid) -> AppResult<()> {
        let staff = self
            .database
            .get_user(staff_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Staff member {staff_id}")))?;

        if !staff.role.is_staff() || !staff.is_active {
            return Err(AppError::invalid_input(format!(
                "User {staff_id} is not an active staff member"
            )));
        }
        Ok(())
    }

    fn staff_lock(&self, staff_id: Uuid) -> Arc<Mutex<()>> {
        self.staff_locks
            .entry(staff_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
