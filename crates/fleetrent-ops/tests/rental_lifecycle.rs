//! Integration tests for rental lifecycle operations.

mod common;

use common::{caller, date, harness, notification, seed_vehicle, SECRET};
use fleetrent_ops::OpsError;
use fleetrent_types::{ErrorCode, RentalStatus};

#[tokio::test]
async fn same_day_rental_charges_one_day() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let created = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-01"), date("2024-05-01"))
        .await
        .unwrap();
    assert_eq!(created.rental.total_cost, 100_000);
    assert_eq!(created.payment.amount, 100_000);
}

#[tokio::test]
async fn end_before_start_is_invalid_range() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let err = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-03"), date("2024-05-01"))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::InvalidRange(_)));
    assert_eq!(err.error_code(), ErrorCode::InvalidRange);
    assert_eq!(err.error_code().http_status(), 400);

    assert!(h.service.list_rentals(&user).unwrap().is_empty());
    assert_eq!(h.gateway.request_count(), 0);
}

#[tokio::test]
async fn overlong_rental_rejected() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let err = h
        .service
        .create_rental(&user, vehicle_id, date("2024-01-01"), date("2026-01-01"))
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::Validation(_)));
    assert!(h.service.list_rentals(&user).unwrap().is_empty());
}

#[tokio::test]
async fn unknown_vehicle_is_not_found() {
    let mut h = harness();
    let user = caller(1);

    let err = h
        .service
        .create_rental(
            &user,
            fleetrent_types::VehicleId(404),
            date("2024-05-01"),
            date("2024-05-03"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::VehicleNotFound(_)));
    assert_eq!(h.gateway.request_count(), 0);
}

#[tokio::test]
async fn invoice_carries_deterministic_reference() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let user = caller(1);

    let created = h
        .service
        .create_rental(&user, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();

    assert_eq!(
        created.payment.external_reference,
        format!("rental-{}", created.rental.id)
    );
    let requests = h.gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].external_id, created.payment.external_reference);
    assert_eq!(requests[0].payer_email, user.email);
    assert_eq!(requests[0].amount, 200_000);
}

#[tokio::test]
async fn return_by_non_owner_is_forbidden() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let owner = caller(1);
    let intruder = caller(2);

    let created = h
        .service
        .create_rental(&owner, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();
    h.service
        .handle_webhook(
            SECRET,
            &notification(&created.payment.external_reference, "PAID", 200_000),
        )
        .unwrap();

    let err = h
        .service
        .return_vehicle(&intruder, created.rental.id)
        .unwrap_err();
    assert!(matches!(err, OpsError::Forbidden));
    assert_eq!(err.error_code().http_status(), 403);

    // State unchanged: still active, still one unit out.
    let views = h.service.list_rentals(&owner).unwrap();
    assert_eq!(views[0].rental.status, RentalStatus::Active);
    assert_eq!(
        h.service.vehicle_detail(vehicle_id).unwrap().available_units,
        2
    );
}

#[tokio::test]
async fn return_of_pending_rental_is_invalid_state() {
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
        .return_vehicle(&user, created.rental.id)
        .unwrap_err();
    assert!(matches!(err, OpsError::InvalidState(RentalStatus::Pending)));
    assert_eq!(err.error_code().http_status(), 400);

    let views = h.service.list_rentals(&user).unwrap();
    assert_eq!(views[0].rental.status, RentalStatus::Pending);
}

#[tokio::test]
async fn double_return_is_invalid_state() {
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

    h.service.return_vehicle(&user, created.rental.id).unwrap();
    let err = h
        .service
        .return_vehicle(&user, created.rental.id)
        .unwrap_err();
    assert!(matches!(
        err,
        OpsError::InvalidState(RentalStatus::Completed)
    ));

    // Stock restored exactly once.
    assert_eq!(
        h.service.vehicle_detail(vehicle_id).unwrap().available_units,
        3
    );
}

#[tokio::test]
async fn cancel_is_owner_only_and_pending_only() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let owner = caller(1);
    let intruder = caller(2);

    let created = h
        .service
        .create_rental(&owner, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();

    let err = h
        .service
        .cancel_rental(&intruder, created.rental.id)
        .unwrap_err();
    assert!(matches!(err, OpsError::Forbidden));

    h.service.cancel_rental(&owner, created.rental.id).unwrap();
    let views = h.service.list_rentals(&owner).unwrap();
    assert_eq!(views[0].rental.status, RentalStatus::Cancelled);

    // Terminal: cannot cancel again.
    let err = h
        .service
        .cancel_rental(&owner, created.rental.id)
        .unwrap_err();
    assert!(matches!(
        err,
        OpsError::InvalidState(RentalStatus::Cancelled)
    ));
}

#[tokio::test]
async fn return_sends_confirmation_notification() {
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

    // One notification from the payment, one from the return.
    assert!(h.notifier.wait_for(1).await);
    h.service.return_vehicle(&user, created.rental.id).unwrap();
    assert!(h.notifier.wait_for(2).await);

    let delivered = h.notifier.delivered();
    assert!(delivered
        .iter()
        .any(|(_, subject, _)| subject == "Vehicle Return Confirmation"));
    assert!(delivered
        .iter()
        .any(|(_, _, body)| body.contains("Toyota Avanza")));
}

#[tokio::test]
async fn payment_detail_scoped_to_owner() {
    let mut h = harness();
    let vehicle_id = seed_vehicle(&mut h.service, 3, 100_000);
    let owner = caller(1);
    let intruder = caller(2);

    let created = h
        .service
        .create_rental(&owner, vehicle_id, date("2024-05-01"), date("2024-05-03"))
        .await
        .unwrap();

    let detail = h
        .service
        .payment_detail(&owner, created.payment.id)
        .unwrap();
    assert_eq!(detail.payment.id, created.payment.id);
    assert_eq!(detail.vehicle.name, "Toyota Avanza");

    let err = h
        .service
        .payment_detail(&intruder, created.payment.id)
        .unwrap_err();
    assert!(matches!(err, OpsError::PaymentNotFound(_)));
}
