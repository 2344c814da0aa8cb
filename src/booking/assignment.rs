// ABOUTME: Staff auto-assignment selection for new appointments
// ABOUTME: Prefers primary assignments, falls back to any qualified staff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Staff auto-assignment
//!
//! Selection runs as an explicit synchronous step inside appointment
//! creation. Candidates arrive ordered primary-first from the database; when
//! no staff member qualifies for any booked service the appointment is
//! created unassigned.

use crate::models::StaffAssignment;
use uuid::Uuid;

/// Pick a staff member from assignment candidates for the booked services.
///
/// Prefers an assignment marked primary for one of the services; otherwise
/// takes any qualified assignment; returns `None` when nobody qualifies.
#[must_use]
pub fn select_staff(candidates: &[StaffAssignment]) -> Option<Uuid> {
    candidates
        .iter()
        .find(|assignment| assignment.is_primary)
        .or_else(|| candidates.first())
        .map(|assignment| assignment.staff_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_primary_assignment() {
        let service_id = Uuid::new_v4();
        let secondary = StaffAssignment::new(Uuid::new_v4(), service_id, false);
        let primary = StaffAssignment::new(Uuid::new_v4(), service_id, true);

        let candidates = vec![secondary.clone(), primary.clone()];
        assert_eq!(select_staff(&candidates), Some(primary.staff_id));
    }

    #[test]
    fn test_falls_back_to_any_qualified() {
        let service_id = Uuid::new_v4();
        let first = StaffAssignment::new(Uuid::new_v4(), service_id, false);
        let second = StaffAssignment::new(Uuid::new_v4(), service_id, false);

        let candidates = vec![first.clone(), second];
        assert_eq!(select_staff(&candidates), Some(first.staff_id));
    }

    #[test]
    fn test_no_candidates_means_unassigned() {
        assert_eq!(select_staff(&[]), None);
    }
}
