// ABOUTME: Integration tests for the booking flow
// ABOUTME: Covers auto-assignment, availability conflicts, coupons, and transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use amara_spa_server::{
    booking::BookingRequest,
    errors::ErrorCode,
    models::{AppointmentStatus, StaffAssignment, UserRole},
};
use chrono::Duration;
use common::{
    create_default_resources, future_slot, seed_active_coupon, seed_service, seed_user,
};
use rust_decimal::Decimal;
use std::str::FromStr;

#[tokio::test]
async fn test_booking_auto_assigns_primary_staff() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let secondary = seed_user(db, "secondary@example.com", UserRole::Staff).await;
    let primary = seed_user(db, "primary@example.com", UserRole::Staff).await;
    let service = seed_service(db, "Hot Stone Massage", "80.00", 60).await;

    db.create_staff_assignment(&StaffAssignment::new(secondary.id, service.id, false))
        .await
        .unwrap();
    db.create_staff_assignment(&StaffAssignment::new(primary.id, service.id, true))
        .await
        .unwrap();

    let outcome = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: future_slot(7, 10),
            staff_id: None,
            coupon_code: None,
        })
        .await
        .unwrap();

    assert_eq!(outcome.appointment.staff_id, Some(primary.id));
    assert_eq!(outcome.appointment.status, AppointmentStatus::Pending);
    assert_eq!(outcome.appointment.duration_minutes, 60);
    assert_eq!(
        outcome.breakdown.final_total,
        Decimal::from_str("80.00").unwrap()
    );
}

#[tokio::test]
async fn test_booking_without_qualified_staff_is_unassigned() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let service = seed_service(db, "Aromatherapy", "55.00", 45).await;

    let outcome = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: future_slot(7, 11),
            staff_id: None,
            coupon_code: None,
        })
        .await
        .unwrap();

    // Silent no-op: the booking stands, unassigned
    assert_eq!(outcome.appointment.staff_id, None);
}

#[tokio::test]
async fn test_overlapping_slot_is_rejected_before_persisting() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let other = seed_user(db, "other@example.com", UserRole::Customer).await;
    let staff = seed_user(db, "staff@example.com", UserRole::Staff).await;
    let service = seed_service(db, "Swedish Massage", "70.00", 60).await;

    db.create_staff_assignment(&StaffAssignment::new(staff.id, service.id, true))
        .await
        .unwrap();

    // Existing appointment occupies [10:00, 11:00)
    let start = future_slot(7, 10);
    resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: start,
            staff_id: Some(staff.id),
            coupon_code: None,
        })
        .await
        .unwrap();

    // [10:30, 11:30) overlaps and must be rejected
    let err = resources
        .booking
        .book(BookingRequest {
            customer_id: other.id,
            service_ids: vec![service.id],
            start_time: start + Duration::minutes(30),
            staff_id: Some(staff.id),
            coupon_code: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SlotUnavailable);

    // Nothing was persisted for the rejected booking
    let appointments = db.list_appointments_for_customer(other.id).await.unwrap();
    assert!(appointments.is_empty());

    // [11:00, 12:00) is adjacent and must be accepted
    let outcome = resources
        .booking
        .book(BookingRequest {
            customer_id: other.id,
            service_ids: vec![service.id],
            start_time: start + Duration::minutes(60),
            staff_id: Some(staff.id),
            coupon_code: None,
        })
        .await
        .unwrap();
    assert_eq!(outcome.appointment.staff_id, Some(staff.id));

    // The staff member now holds exactly the two non-overlapping slots
    let slots = db.staff_booked_slots(staff.id).await.unwrap();
    assert_eq!(slots.len(), 2);
}

#[tokio::test]
async fn test_canceled_appointment_frees_its_slot() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let staff = seed_user(db, "staff@example.com", UserRole::Staff).await;
    let service = seed_service(db, "Pedicure", "35.00", 30).await;
    db.create_staff_assignment(&StaffAssignment::new(staff.id, service.id, true))
        .await
        .unwrap();

    let start = future_slot(7, 14);
    let first = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: start,
            staff_id: Some(staff.id),
            coupon_code: None,
        })
        .await
        .unwrap();

    resources
        .booking
        .transition_status(
            first.appointment.id,
            AppointmentStatus::Canceled,
            customer.id,
            UserRole::Customer,
        )
        .await
        .unwrap();

    // The same slot can now be booked again
    resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: start,
            staff_id: Some(staff.id),
            coupon_code: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_notification_failure_does_not_roll_back_booking() {
    let resources = common::create_resources_with_failing_notifier().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let service = seed_service(db, "Body Wrap", "75.00", 60).await;

    let outcome = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: future_slot(7, 10),
            staff_id: None,
            coupon_code: None,
        })
        .await
        .unwrap();

    // The booking stands even though the invoice never went out
    let stored = db
        .list_appointments_for_customer(customer.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, outcome.appointment.id);
}

#[tokio::test]
async fn test_booking_with_empty_service_set_is_rejected() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;

    let err = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![],
            start_time: future_slot(7, 9),
            staff_id: None,
            coupon_code: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_booking_with_unknown_coupon_is_rejected() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let service = seed_service(db, "Manicure", "25.00", 30).await;

    let err = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: future_slot(7, 9),
            staff_id: None,
            coupon_code: Some("NO-SUCH-CODE".into()),
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_booking_with_active_coupon_discounts_total() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let service = seed_service(db, "Facial", "100.00", 45).await;
    seed_active_coupon(db, "WELCOME20", "20").await;

    let outcome = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: future_slot(7, 15),
            staff_id: None,
            coupon_code: Some("WELCOME20".into()),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome.breakdown.total_discount,
        Decimal::from_str("20").unwrap()
    );
    assert_eq!(
        outcome.breakdown.final_total,
        Decimal::from_str("80").unwrap()
    );
    assert!(outcome.appointment.coupon_id.is_some());
}

#[tokio::test]
async fn test_multi_service_booking_sums_durations() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let massage = seed_service(db, "Massage", "60.00", 60).await;
    let facial = seed_service(db, "Facial", "40.00", 30).await;

    let outcome = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![massage.id, facial.id],
            start_time: future_slot(7, 13),
            staff_id: None,
            coupon_code: None,
        })
        .await
        .unwrap();

    assert_eq!(outcome.appointment.duration_minutes, 90);
    assert_eq!(
        outcome.breakdown.base_total,
        Decimal::from_str("100.00").unwrap()
    );
}

#[tokio::test]
async fn test_customer_cannot_complete_appointment() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let staff = seed_user(db, "staff@example.com", UserRole::Staff).await;
    let service = seed_service(db, "Haircut", "40.00", 30).await;

    let outcome = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: future_slot(7, 16),
            staff_id: None,
            coupon_code: None,
        })
        .await
        .unwrap();

    // Customers may not confirm their own bookings
    let err = resources
        .booking
        .transition_status(
            outcome.appointment.id,
            AppointmentStatus::Confirmed,
            customer.id,
            UserRole::Customer,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    // Staff confirm, then complete
    resources
        .booking
        .transition_status(
            outcome.appointment.id,
            AppointmentStatus::Confirmed,
            staff.id,
            UserRole::Staff,
        )
        .await
        .unwrap();
    resources
        .booking
        .transition_status(
            outcome.appointment.id,
            AppointmentStatus::Completed,
            staff.id,
            UserRole::Staff,
        )
        .await
        .unwrap();

    // Completed is terminal
    let err = resources
        .booking
        .transition_status(
            outcome.appointment.id,
            AppointmentStatus::Canceled,
            staff.id,
            UserRole::Staff,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_stranger_cannot_touch_anothers_appointment() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let stranger = seed_user(db, "stranger@example.com", UserRole::Customer).await;
    let service = seed_service(db, "Sauna", "20.00", 60).await;

    let outcome = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: future_slot(7, 17),
            staff_id: None,
            coupon_code: None,
        })
        .await
        .unwrap();

    let err = resources
        .booking
        .transition_status(
            outcome.appointment.id,
            AppointmentStatus::Canceled,
            stranger.id,
            UserRole::Customer,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_pricing_existing_appointment_reflects_coupon_expiry() {
    let resources = create_default_resources().await;
    let db = &resources.database;

    let customer = seed_user(db, "customer@example.com", UserRole::Customer).await;
    let service = seed_service(db, "Massage", "100.00", 60).await;

    // Valid now, expires almost immediately
    let now = chrono::Utc::now();
    common::seed_coupon(db, "FLASH", "30", now - Duration::hours(1), now + Duration::seconds(1))
        .await;

    let outcome = resources
        .booking
        .book(BookingRequest {
            customer_id: customer.id,
            service_ids: vec![service.id],
            start_time: future_slot(7, 12),
            staff_id: None,
            coupon_code: Some("FLASH".into()),
        })
        .await
        .unwrap();
    assert_eq!(
        outcome.breakdown.total_discount,
        Decimal::from_str("30").unwrap()
    );

    // After the window elapses the discount drops to zero, but the coupon
    // reference stays on the appointment
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

    let repriced = resources
        .booking
        .price_existing(outcome.appointment.id)
        .await
        .unwrap();
    assert_eq!(repriced.total_discount, Decimal::ZERO);
    assert_eq!(repriced.final_total, Decimal::from_str("100.00").unwrap());

    let stored = resources
        .booking
        .get_appointment(outcome.appointment.id)
        .await
        .unwrap();
    assert!(stored.coupon_id.is_some());
}
