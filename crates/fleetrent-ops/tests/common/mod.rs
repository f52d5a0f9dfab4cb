//! Shared test fixtures for the operations integration tests.

use std::sync::Arc;

use chrono::NaiveDate;
use fleetrent_gateway::MockInvoiceGateway;
use fleetrent_ops::{Caller, MockNotifier, OpsConfig, RentalService};
use fleetrent_store::{NewVehicle, Store, VehicleStore};
use fleetrent_types::{UserId, VehicleId, WebhookNotification};

/// Shared webhook secret for all tests.
pub const SECRET: &str = "whsec-test";

pub struct TestHarness {
    pub service: RentalService,
    pub gateway: Arc<MockInvoiceGateway>,
    pub notifier: Arc<MockNotifier>,
}

/// Build a service over an in-memory store with mock collaborators.
pub fn harness() -> TestHarness {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let store = Store::open_in_memory().unwrap();
    let gateway = Arc::new(MockInvoiceGateway::new());
    let notifier = Arc::new(MockNotifier::new());

    let service = RentalService::new(
        store,
        gateway.clone(),
        notifier.clone(),
        OpsConfig::new(SECRET),
    );
    TestHarness {
        service,
        gateway,
        notifier,
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn caller(id: i64) -> Caller {
    Caller::new(UserId(id), format!("user{}@example.com", id))
}

pub fn seed_vehicle(service: &mut RentalService, units: u32, unit_price: u64) -> VehicleId {
    service
        .state
        .vehicles
        .insert(NewVehicle {
            name: "Toyota Avanza".to_string(),
            category: "mpv".to_string(),
            available_units: units,
            unit_price,
        })
        .unwrap()
        .id
}

pub fn notification(reference: &str, status: &str, amount: u64) -> WebhookNotification {
    WebhookNotification {
        external_id: reference.to_string(),
        status: status.to_string(),
        amount,
        id: format!("ntf-{}-{}", reference, status.to_lowercase()),
    }
}
