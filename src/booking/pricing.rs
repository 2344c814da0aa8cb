// ABOUTME: Appointment price calculation with coupon discounting
// ABOUTME: Pure fixed-point arithmetic over the booked service set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! Pricing calculator
//!
//! Totals are derived on demand from the current service set and the
//! appointment's coupon, evaluated at an explicit instant. The discount
//! freezes at computation time, not at booking time: pricing the same
//! appointment after its coupon window elapses yields a smaller discount.

use crate::models::{Coupon, Service};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One service's contribution to the total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLine {
    /// Service identifier
    pub service_id: Uuid,
    /// Service name at pricing time
    pub name: String,
    /// Base price
    pub price: Decimal,
}

/// Full price breakdown for an appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Per-service lines
    pub lines: Vec<PriceLine>,
    /// Sum of base prices
    pub base_total: Decimal,
    /// Discount taken off the base total
    pub total_discount: Decimal,
    /// Amount due; never negative
    pub final_total: Decimal,
    /// Code of the coupon that produced the discount, if one applied
    pub applied_coupon: Option<String>,
}

/// Compute the price breakdown for a set of services and an optional coupon,
/// evaluated at `now`.
///
/// An expired or not-yet-valid coupon contributes no discount but is not an
/// error: the reference stays on the appointment as a historical record. The
/// discount is capped at the base total, so the final total never goes
/// negative even for discounts above 100%.
#[must_use]
pub fn price_appointment(
    services: &[Service],
    coupon: Option<&Coupon>,
    now: DateTime<Utc>,
) -> PriceBreakdown {
    let lines: Vec<PriceLine> = services
        .iter()
        .map(|service| PriceLine {
            service_id: service.id,
            name: service.name.clone(),
            price: service.price,
        })
        .collect();

    let base_total: Decimal = lines.iter().map(|line| line.price).sum();

    let (total_discount, applied_coupon) = match coupon {
        Some(coupon) if coupon.is_active(now) => {
            let discount = base_total * coupon.discount_percent / Decimal::from(100);
            (discount.min(base_total), Some(coupon.code.clone()))
        }
        _ => (Decimal::ZERO, None),
    };

    PriceBreakdown {
        lines,
        base_total,
        total_discount,
        final_total: base_total - total_discount,
        applied_coupon,
    }
}

/// Total duration of a service set in minutes
#[must_use]
pub fn total_duration_minutes(services: &[Service]) -> u32 {
    services
        .iter()
        .map(|service| service.duration_minutes)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    fn service(name: &str, price: &str, duration: u32) -> Service {
        Service::new(
            name.into(),
            format!("{name} description"),
            duration,
            Decimal::from_str(price).unwrap(),
        )
    }

    fn active_coupon(percent: &str, now: DateTime<Utc>) -> Coupon {
        Coupon::new(
            "TEST".into(),
            Decimal::from_str(percent).unwrap(),
            now - Duration::hours(1),
            now + Duration::hours(1),
        )
    }

    #[test]
    fn test_no_coupon_total_is_base_sum() {
        let now = Utc::now();
        let services = vec![service("Massage", "60.00", 60), service("Facial", "45.50", 30)];

        let breakdown = price_appointment(&services, None, now);

        assert_eq!(breakdown.base_total, Decimal::from_str("105.50").unwrap());
        assert_eq!(breakdown.total_discount, Decimal::ZERO);
        assert_eq!(breakdown.final_total, Decimal::from_str("105.50").unwrap());
        assert!(breakdown.applied_coupon.is_none());
        assert_eq!(breakdown.lines.len(), 2);
    }

    #[test]
    fn test_active_coupon_discounts_base_total() {
        let now = Utc::now();
        let services = vec![service("Massage", "100.00", 60)];
        let coupon = active_coupon("20", now);

        let breakdown = price_appointment(&services, Some(&coupon), now);

        assert_eq!(breakdown.total_discount, Decimal::from_str("20.00").unwrap());
        assert_eq!(breakdown.final_total, Decimal::from_str("80.00").unwrap());
        assert_eq!(breakdown.applied_coupon.as_deref(), Some("TEST"));
    }

    #[test]
    fn test_expired_coupon_contributes_nothing() {
        let now = Utc::now();
        let services = vec![service("Massage", "100.00", 60)];
        let expired = Coupon::new(
            "OLD".into(),
            Decimal::from(50),
            now - Duration::days(10),
            now - Duration::days(5),
        );

        let breakdown = price_appointment(&services, Some(&expired), now);

        assert_eq!(breakdown.total_discount, Decimal::ZERO);
        assert_eq!(breakdown.final_total, Decimal::from_str("100.00").unwrap());
        assert!(breakdown.applied_coupon.is_none());
    }

    #[test]
    fn test_discount_above_hundred_percent_clamps_to_zero() {
        let now = Utc::now();
        let services = vec![service("Massage", "80.00", 60)];
        let coupon = active_coupon("150", now);

        let breakdown = price_appointment(&services, Some(&coupon), now);

        assert_eq!(breakdown.total_discount, breakdown.base_total);
        assert_eq!(breakdown.final_total, Decimal::ZERO);
    }

    #[test]
    fn test_zero_services_price_to_zero() {
        let now = Utc::now();
        let coupon = active_coupon("20", now);

        let breakdown = price_appointment(&[], Some(&coupon), now);

        assert_eq!(breakdown.base_total, Decimal::ZERO);
        assert_eq!(breakdown.final_total, Decimal::ZERO);
        assert!(breakdown.lines.is_empty());
    }

    #[test]
    fn test_pricing_is_deterministic_for_fixed_instant() {
        let now = Utc::now();
        let services = vec![service("Massage", "100.00", 60), service("Facial", "55.00", 45)];
        let coupon = active_coupon("10", now);

        let first = price_appointment(&services, Some(&coupon), now);
        let second = price_appointment(&services, Some(&coupon), now);

        assert_eq!(first.final_total, second.final_total);
        assert_eq!(first.total_discount, second.total_discount);
    }

    #[test]
    fn test_discount_drops_when_window_elapses_between_calls() {
        let now = Utc::now();
        let services = vec![service("Massage", "100.00", 60)];
        let coupon = Coupon::new(
            "BRIEF".into(),
            Decimal::from(25),
            now - Duration::hours(1),
            now + Duration::minutes(5),
        );

        let during = price_appointment(&services, Some(&coupon), now);
        let after = price_appointment(&services, Some(&coupon), now + Duration::minutes(10));

        assert_eq!(during.total_discount, Decimal::from_str("25.00").unwrap());
        assert_eq!(after.total_discount, Decimal::ZERO);
    }

    #[test]
    fn test_total_duration() {
        let services = vec![service("Massage", "60.00", 60), service("Facial", "45.00", 30)];
        assert_eq!(total_duration_minutes(&services), 90);
        assert_eq!(total_duration_minutes(&[]), 0);
    }
}
