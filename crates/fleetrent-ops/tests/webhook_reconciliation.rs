//! Integration tests for the webhook reconciliation protocol.
//!
//! These cover the consistency properties: authenticity before lookups,
//! exactly-once application under replay, the last-unit race, and the
//! lapse path that never touches inventory.

mod common;

use common::{caller, date, harness, notification, seed_vehicle, SECRET};
use fleetrent_ops::{OpsError, ReconcileOutcome};
use fleetrent_types::{ErrorCode, PaymentStatus, RentalStatus};

#[tokio::test]
async fn replayed_paid_notification_applies_once() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let created = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();
    let ntf = notification(&created.payment.external_reference, "PAID", 200_000);

    let first = h.service.handle_webhook(SECRET, &ntf).unwrap();
    assert_eq!(first, ReconcileOutcome::Activated);

    // Same reference, same status: success, but nothing moves again.
    let second = h.service.handle_webhook(SECRET, &ntf).unwrap();
    assert_eq!(second, ReconcileOutcome::Duplicate);
    assert!(second.is_noop());

    let views = h.service.list_rentals(&user).unwrap();
    assert_eq!(views[0].rental.status, RentalStatus::Active);
    // Decremented exactly once.
    assert_eq!(views[0].vehicle.available_units, 2);
}

#[tokio::test]
async fn invalid_token_never_mutates() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let created = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();

    let before_rentals = h.service.list_rentals(&user).unwrap();
    let before_payments = h.service.list_payments(&user).unwrap();
    let before_vehicle = h.service.vehicle_detail(vehicle_id).unwrap();

    let err = h
        .service
        .handle_webhook(
            "wrong-token",
            &notification(&created.payment.external_reference, "PAID", 200_000),
        )
        .unwrap_err();
    assert!(matches!(err, OpsError::Unauthorized));
    assert_eq!(err.error_code(), ErrorCode::Unauthorized);

    // Before/after comparison: no row changed.
    assert_eq!(h.service.list_rentals(&user).unwrap(), before_rentals);
    assert_eq!(h.service.list_payments(&user).unwrap(), before_payments);
    assert_eq!(h.service.vehicle_detail(vehicle_id).unwrap(), before_vehicle);
}

#[tokio::test]
async fn unknown_reference_rejected_without_side_effects() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);

    let err = h
        .service
        .handle_webhook(SECRET, &notification("rental-999", "PAID", 100_000))
        .unwrap_err();
    assert!(matches!(err, OpsError::PaymentNotFound(_)));
    assert_eq!(err.error_code().http_status(), 404);

    assert_eq!(
        h.service.vehicle_detail(vehicle_id).unwrap().available_units,
        3
    );
}

#[tokio::test]
async fn unknown_status_rejected_without_side_effects() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let created = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();

    let err = h
        .service
        .handle_webhook(
            SECRET,
            &notification(&created.payment.external_reference, "ON_HOLD", 200_000),
        )
        .unwrap_err();
    assert!(matches!(err, OpsError::Validation(_)));

    let payments = h.service.list_payments(&user).unwrap();
    assert_eq!(payments[0].payment.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn last_unit_race_activates_at_most_one() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 1, 100_000);
    let alice = caller(1);
    let bob = caller(2);

    // Both users reserve the last unit; neither holds stock yet.
    let first = h
        .service
        .create_rental(&alice, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();
    let second = h
        .service
        .create_rental(&bob, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();
    assert_eq!(
        h.service.vehicle_detail(vehicle_id).unwrap().available_units,
        1
    );

    // Both pay. The first confirmation wins the unit.
    let outcome = h
        .service
        .handle_webhook(
            SECRET,
            &notification(&first.payment.external_reference, "PAID", 200_000),
        )
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Activated);

    let outcome = h
        .service
        .handle_webhook(
            SECRET,
            &notification(&second.payment.external_reference, "PAID", 200_000),
        )
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::CancelledOutOfStock);

    let alice_views = h.service.list_rentals(&alice).unwrap();
    assert_eq!(alice_views[0].rental.status, RentalStatus::Active);

    let bob_views = h.service.list_rentals(&bob).unwrap();
    assert_eq!(bob_views[0].rental.status, RentalStatus::Cancelled);

    // Stock never went negative.
    assert_eq!(
        h.service.vehicle_detail(vehicle_id).unwrap().available_units,
        0
    );

    // Bob's money is explicitly flagged for manual refund, and the
    // payment stays recorded as collected.
    let bob_payments = h.service.list_payments(&bob).unwrap();
    assert_eq!(bob_payments[0].payment.status, PaymentStatus::Paid);
    assert!(bob_payments[0].payment.requires_refund);
}

#[tokio::test]
async fn expired_on_pending_rental_cancels_without_stock_change() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let created = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();

    let outcome = h
        .service
        .handle_webhook(
            SECRET,
            &notification(&created.payment.external_reference, "EXPIRED", 200_000),
        )
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Cancelled);

    let views = h.service.list_rentals(&user).unwrap();
    assert_eq!(views[0].rental.status, RentalStatus::Cancelled);
    let payments = h.service.list_payments(&user).unwrap();
    assert_eq!(payments[0].payment.status, PaymentStatus::Expired);
    assert!(!payments[0].payment.requires_refund);

    // Inventory was never decremented, so none is restored.
    assert_eq!(
        h.service.vehicle_detail(vehicle_id).unwrap().available_units,
        3
    );
}

#[tokio::test]
async fn settled_payment_rejects_other_transitions() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let created = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();
    let reference = created.payment.external_reference.clone();

    h.service
        .handle_webhook(SECRET, &notification(&reference, "PAID", 200_000))
        .unwrap();

    // A late "failed" for a settled payment is a conflict, not applied.
    let err = h
        .service
        .handle_webhook(SECRET, &notification(&reference, "FAILED", 200_000))
        .unwrap_err();
    assert!(matches!(err, OpsError::Conflict(_)));
    assert_eq!(err.error_code().http_status(), 409);

    let payments = h.service.list_payments(&user).unwrap();
    assert_eq!(payments[0].payment.status, PaymentStatus::Paid);
    assert_eq!(
        h.service.vehicle_detail(vehicle_id).unwrap().available_units,
        2
    );
}

#[tokio::test]
async fn paid_confirmation_sends_notification_after_commit() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let created = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();

    h.service
        .handle_webhook(
            SECRET,
            &notification(&created.payment.external_reference, "PAID", 200_000),
        )
        .unwrap();

    assert!(h.notifier.wait_for(1).await);
    let (to, subject, body) = h.notifier.delivered().remove(0);
    assert_eq!(to, user.email);
    assert_eq!(subject, "Payment Successful");
    assert!(body.contains("200000"));
}

#[tokio::test]
async fn failed_notification_delivery_does_not_fail_reconciliation() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);
    h.notifier.set_failing(true);

    let created = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();

    // Reconciliation commits even though delivery will fail.
    let outcome = h
        .service
        .handle_webhook(
            SECRET,
            &notification(&created.payment.external_reference, "PAID", 200_000),
        )
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Activated);

    let views = h.service.list_rentals(&user).unwrap();
    assert_eq!(views[0].rental.status, RentalStatus::Active);
}
