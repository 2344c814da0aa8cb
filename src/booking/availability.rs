// ABOUTME: Staff availability checking over half-open time intervals
// ABOUTME: Defines TimeSlot and the overlap predicate used at booking time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Slot availability
//!
//! A slot is the half-open interval `[start, start + duration)`. Two slots
//! conflict iff `a.start < b.end && b.start < a.end`; back-to-back slots do
//! not conflict.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A staff member's time interval, proposed or already booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Slot start
    pub start: DateTime<Utc>,
    /// Slot length in minutes
    pub duration_minutes: u32,
}

impl TimeSlot {
    /// Create a slot
    #[must_use]
    pub const fn new(start: DateTime<Utc>, duration_minutes: u32) -> Self {
        Self {
            start,
            duration_minutes,
        }
    }

    /// Exclusive slot end
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Half-open overlap test
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// First existing slot that conflicts with the proposed one, if any
#[must_use]
pub fn find_conflict<'a>(proposed: &TimeSlot, existing: &'a [TimeSlot]) -> Option<&'a TimeSlot> {
    existing.iter().find(|slot| slot.overlaps(proposed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_overlapping_slots_conflict() {
        // Existing 10:00-11:00, proposed 10:30-11:30
        let existing = TimeSlot::new(at(10, 0), 60);
        let proposed = TimeSlot::new(at(10, 30), 60);
        assert!(existing.overlaps(&proposed));
        assert!(proposed.overlaps(&existing));
    }

    #[test]
    fn test_adjacent_slots_do_not_conflict() {
        // Existing 10:00-11:00, proposed 11:00-12:00
        let existing = TimeSlot::new(at(10, 0), 60);
        let proposed = TimeSlot::new(at(11, 0), 60);
        assert!(!existing.overlaps(&proposed));
        assert!(!proposed.overlaps(&existing));
    }

    #[test]
    fn test_contained_slot_conflicts() {
        let existing = TimeSlot::new(at(9, 0), 180);
        let proposed = TimeSlot::new(at(10, 0), 30);
        assert!(existing.overlaps(&proposed));
    }

    #[test]
    fn test_zero_duration_slot_never_conflicts() {
        let existing = TimeSlot::new(at(10, 0), 60);
        let proposed = TimeSlot::new(at(10, 30), 0);
        assert!(!proposed.overlaps(&existing));
    }

    #[test]
    fn test_find_conflict_returns_first_overlap() {
        let booked = vec![
            TimeSlot::new(at(9, 0), 30),
            TimeSlot::new(at(10, 0), 60),
            TimeSlot::new(at(12, 0), 45),
        ];
        let proposed = TimeSlot::new(at(10, 30), 60);

        let conflict = find_conflict(&proposed, &booked).unwrap();
        assert_eq!(conflict.start, at(10, 0));

        let free = TimeSlot::new(at(13, 0), 60);
        assert!(find_conflict(&free, &booked).is_none());
    }
}
