//! Read-only query operations.
//!
//! Catalog queries are public; rental and payment views are scoped to
//! the authenticated caller. Each call reads one consistent snapshot.

use fleetrent_store::{PaymentView, RentalView, VehicleFilter, VehicleStore};
use fleetrent_types::{PaymentId, Vehicle, VehicleId};

use crate::error::{OpsError, OpsResult};
use crate::service::{Caller, RentalService};

impl RentalService {
    /// Browse the vehicle catalog, optionally filtered by category and
    /// availability. Public; no caller required.
    pub fn list_vehicles(&self, filter: VehicleFilter) -> OpsResult<Vec<Vehicle>> {
        Ok(self.state.vehicles.list(filter)?)
    }

    /// Load one catalog entry. Public; no caller required.
    pub fn vehicle_detail(&self, vehicle_id: VehicleId) -> OpsResult<Vehicle> {
        self.state
            .vehicles
            .get(vehicle_id)?
            .ok_or(OpsError::VehicleNotFound(vehicle_id))
    }

    /// List the caller's rentals with their vehicles, newest first.
    pub fn list_rentals(&self, caller: &Caller) -> OpsResult<Vec<RentalView>> {
        Ok(self.state.rental_views_for_user(caller.id)?)
    }

    /// List the caller's payments, newest first.
    pub fn list_payments(&self, caller: &Caller) -> OpsResult<Vec<PaymentView>> {
        Ok(self.state.payment_views_for_user(caller.id)?)
    }

    /// Load one of the caller's payments.
    ///
    /// A payment owned by someone else is indistinguishable from a
    /// missing one.
    pub fn payment_detail(&self, caller: &Caller, payment_id: PaymentId) -> OpsResult<PaymentView> {
        self.state
            .payment_view_for_user(caller.id, payment_id)?
            .ok_or_else(|| OpsError::PaymentNotFound(format!("payment id {}", payment_id)))
    }
}
