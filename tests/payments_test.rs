// ABOUTME: Integration tests for cash and gateway payment capture
// ABOUTME: Covers the itemized-sum guard, execute transitions, and failure isolation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use amara_spa_server::{
    booking::BookingRequest,
    errors::ErrorCode,
    gateway::PaymentItem,
    models::{AppointmentStatus, PaymentMethod, PaymentStatus, UserRole},
};
use common::{
    create_default_resources, create_test_resources, future_slot, seed_active_coupon,
    seed_service, seed_user, ScriptedGateway,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

async fn booked_appointment(
    resources: &amara_spa_server::resources::ServerResources,
    customer_id: Uuid,
    service_price: &str,
    coupon_code: Option<String>,
) -> Uuid {
    let service = seed_service(&resources.database, "Massage", service_price, 60).await;
    resources
        .booking
        .book(BookingRequest {
            customer_id,
            service_ids: vec![service.id],
            start_time: future_slot(7, 10),
            staff_id: None,
            coupon_code,
        })
        .await
        .unwrap()
        .appointment
        .id
}

#[tokio::test]
async fn test_cash_payment_records_pending_payment() {
    let resources = create_default_resources().await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;
    let appointment_id = booked_appointment(&resources, customer.id, "50.00", None).await;

    let receipt = resources
        .payments
        .cash_payment(appointment_id, customer.id, UserRole::Customer)
        .await
        .unwrap();

    assert_eq!(receipt.amount, Decimal::from_str("50.00").unwrap());
    assert_eq!(receipt.method, PaymentMethod::Cash);
    assert_eq!(receipt.appointment_status, AppointmentStatus::Pending);

    let payments = resources
        .database
        .list_payments_for_appointment(appointment_id)
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status, PaymentStatus::Pending);
    assert_eq!(payments[0].amount.to_string(), "50.00");

    let appointment = resources
        .booking
        .get_appointment(appointment_id)
        .await
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_cash_payment_rejected_for_canceled_appointment() {
    let resources = create_default_resources().await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;
    let appointment_id = booked_appointment(&resources, customer.id, "50.00", None).await;

    resources
        .booking
        .transition_status(
            appointment_id,
            AppointmentStatus::Canceled,
            customer.id,
            UserRole::Customer,
        )
        .await
        .unwrap();

    let err = resources
        .payments
        .cash_payment(appointment_id, customer.id, UserRole::Customer)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_gateway_payment_rejects_item_sum_mismatch() {
    let resources = create_default_resources().await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;
    seed_active_coupon(&resources.database, "TEN", "10").await;
    // $50.00 base with 10% off: calculated final total is $45.00
    let appointment_id =
        booked_appointment(&resources, customer.id, "50.00", Some("TEN".into())).await;

    // Caller itemizes $48.00, which does not match $45.00
    let err = resources
        .payments
        .create_gateway_payment(
            appointment_id,
            customer.id,
            UserRole::Customer,
            Some(vec![PaymentItem {
                name: "Massage".into(),
                amount: Decimal::from_str("48.00").unwrap(),
            }]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);

    // The guard fired before the gateway was contacted and nothing persisted
    let payments = resources
        .database
        .list_payments_for_appointment(appointment_id)
        .await
        .unwrap();
    assert!(payments.is_empty());
}

#[tokio::test]
async fn test_gateway_mismatch_aborts_before_contacting_gateway() {
    let gateway = Arc::new(ScriptedGateway::succeeding());
    let resources = create_test_resources(gateway.clone()).await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;
    let appointment_id = booked_appointment(&resources, customer.id, "45.00", None).await;

    let _ = resources
        .payments
        .create_gateway_payment(
            appointment_id,
            customer.id,
            UserRole::Customer,
            Some(vec![PaymentItem {
                name: "Massage".into(),
                amount: Decimal::from_str("48.00").unwrap(),
            }]),
        )
        .await
        .unwrap_err();

    assert_eq!(
        gateway.create_calls.load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_gateway_payment_flow_confirms_appointment() {
    let resources = create_default_resources().await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;
    seed_active_coupon(&resources.database, "TEN", "10").await;
    let appointment_id =
        booked_appointment(&resources, customer.id, "50.00", Some("TEN".into())).await;

    // Default itemization (services + discount line) matches the total
    let approval = resources
        .payments
        .create_gateway_payment(appointment_id, customer.id, UserRole::Customer, None)
        .await
        .unwrap();
    assert!(approval.approval_url.contains("approve"));

    let payments = resources
        .database
        .list_payments_for_appointment(appointment_id)
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status, PaymentStatus::Pending);
    assert_eq!(payments[0].method, PaymentMethod::Paypal);
    assert_eq!(payments[0].amount, Decimal::from_str("45.00").unwrap());

    // Payer approves, caller executes
    let execution = resources
        .payments
        .execute_gateway_payment(
            &approval.payment_id,
            "PAYER-1",
            customer.id,
            UserRole::Customer,
        )
        .await
        .unwrap();
    assert_eq!(execution.state, "approved");

    let payments = resources
        .database
        .list_payments_for_appointment(appointment_id)
        .await
        .unwrap();
    assert_eq!(payments[0].status, PaymentStatus::Completed);

    let appointment = resources
        .booking
        .get_appointment(appointment_id)
        .await
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn test_gateway_execute_failure_mutates_nothing() {
    let gateway = Arc::new(ScriptedGateway::rejecting_execute());
    let resources = create_test_resources(gateway).await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;
    let appointment_id = booked_appointment(&resources, customer.id, "60.00", None).await;

    let approval = resources
        .payments
        .create_gateway_payment(appointment_id, customer.id, UserRole::Customer, None)
        .await
        .unwrap();

    let err = resources
        .payments
        .execute_gateway_payment(
            &approval.payment_id,
            "PAYER-1",
            customer.id,
            UserRole::Customer,
        )
        .await
        .unwrap_err();

    // Gateway failure surfaced verbatim
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert!(err.message.contains("scripted execute failure"));

    // Neither record moved
    let payments = resources
        .database
        .list_payments_for_appointment(appointment_id)
        .await
        .unwrap();
    assert_eq!(payments[0].status, PaymentStatus::Pending);

    let appointment = resources
        .booking
        .get_appointment(appointment_id)
        .await
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_gateway_create_rejection_surfaces_verbatim() {
    let gateway = Arc::new(ScriptedGateway::rejecting_create());
    let resources = create_test_resources(gateway).await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;
    let appointment_id = booked_appointment(&resources, customer.id, "60.00", None).await;

    let err = resources
        .payments
        .create_gateway_payment(appointment_id, customer.id, UserRole::Customer, None)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert!(err.message.contains("scripted create failure"));

    let payments = resources
        .database
        .list_payments_for_appointment(appointment_id)
        .await
        .unwrap();
    assert!(payments.is_empty());
}

#[tokio::test]
async fn test_execute_is_idempotent_once_completed() {
    let gateway = Arc::new(ScriptedGateway::succeeding());
    let resources = create_test_resources(gateway.clone()).await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;
    let appointment_id = booked_appointment(&resources, customer.id, "60.00", None).await;

    let approval = resources
        .payments
        .create_gateway_payment(appointment_id, customer.id, UserRole::Customer, None)
        .await
        .unwrap();

    resources
        .payments
        .execute_gateway_payment(&approval.payment_id, "PAYER-1", customer.id, UserRole::Customer)
        .await
        .unwrap();
    let second = resources
        .payments
        .execute_gateway_payment(&approval.payment_id, "PAYER-1", customer.id, UserRole::Customer)
        .await
        .unwrap();

    assert_eq!(second.state, "approved");
    // The gateway saw exactly one execute call
    assert_eq!(
        gateway.execute_calls.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn test_stranger_cannot_pay_for_anothers_appointment() {
    let resources = create_default_resources().await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;
    let stranger = seed_user(&resources.database, "stranger@example.com", UserRole::Customer).await;
    let appointment_id = booked_appointment(&resources, customer.id, "50.00", None).await;

    let err = resources
        .payments
        .cash_payment(appointment_id, stranger.id, UserRole::Customer)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_execute_unknown_gateway_payment_is_not_found() {
    let resources = create_default_resources().await;
    let customer = seed_user(&resources.database, "customer@example.com", UserRole::Customer).await;

    let err = resources
        .payments
        .execute_gateway_payment("PAY-UNKNOWN", "PAYER-1", customer.id, UserRole::Customer)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
