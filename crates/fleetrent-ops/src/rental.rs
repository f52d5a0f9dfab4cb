//! Rental lifecycle operations: create, cancel, return.
//!
//! Payment confirmation is not here; only the webhook reconciler may
//! move a rental from `Pending` to `Active`.

use chrono::NaiveDate;
use tracing::{info, warn};

use fleetrent_gateway::CreateInvoiceRequest;
use fleetrent_store::{
    rentals, vehicles, NewPayment, NewRental, PaymentStore, RentalStore, VehicleStore,
};
use fleetrent_types::{
    constants::DATE_FORMAT, external_reference, rental_cost, rental_days, NotificationKind,
    RentalId, RentalStatus, VehicleId,
};

use crate::error::{OpsError, OpsResult};
use crate::notify::OutboundNotification;
use crate::service::{Caller, CreatedRental, RentalService};

impl RentalService {
    /// Create a rental for a date range and issue its payable invoice.
    ///
    /// 1. Validates the range (`end >= start`, bounded length) and the
    ///    vehicle's existence. No stock is taken here: inventory commits
    ///    at payment confirmation, not at reservation.
    /// 2. Persists the `Pending` rental, whose id keys the deterministic
    ///    external reference.
    /// 3. Asks the gateway for an invoice. On failure, the pending row
    ///    is erased again so the aborted creation leaves no local state.
    /// 4. Persists the `Pending` payment record mirroring the invoice.
    pub async fn create_rental(
        &mut self,
        caller: &Caller,
        vehicle_id: VehicleId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> OpsResult<CreatedRental> {
        if end_date < start_date {
            return Err(OpsError::InvalidRange(format!(
                "end {} before start {}",
                end_date.format(DATE_FORMAT),
                start_date.format(DATE_FORMAT)
            )));
        }
        let days = rental_days(start_date, end_date);
        if days > self.config().max_rental_days {
            return Err(OpsError::validation(format!(
                "rental of {} days exceeds the {}-day maximum",
                days,
                self.config().max_rental_days
            )));
        }
        if caller.email.is_empty() {
            return Err(OpsError::validation("payer email is required"));
        }

        let vehicle = self
            .state
            .vehicles
            .get(vehicle_id)?
            .ok_or(OpsError::VehicleNotFound(vehicle_id))?;
        let total_cost = rental_cost(vehicle.unit_price, start_date, end_date);

        let rental = self.state.rentals.insert(NewRental {
            user_id: caller.id,
            vehicle_id,
            start_date,
            end_date,
            total_cost,
        })?;
        let reference = external_reference(rental.id);

        let invoice = match self
            .gateway()
            .create_invoice(CreateInvoiceRequest {
                external_id: reference.clone(),
                amount: total_cost,
                payer_email: caller.email.clone(),
                description: format!("Rental of {} for {} day(s)", vehicle.name, days),
            })
            .await
        {
            Ok(invoice) => invoice,
            Err(e) => {
                warn!(
                    rental_id = %rental.id,
                    error = %e,
                    "Invoice creation failed, rolling back pending rental"
                );
                self.rollback_pending_rental(rental.id);
                return Err(e.into());
            }
        };

        let payment = match self.state.payments.insert(NewPayment {
            rental_id: rental.id,
            invoice_id: invoice.id,
            external_reference: reference,
            amount: invoice.amount,
            payment_url: invoice.invoice_url,
            payer_email: caller.email.clone(),
        }) {
            Ok(payment) => payment,
            Err(e) => {
                self.rollback_pending_rental(rental.id);
                return Err(e.into());
            }
        };

        info!(
            rental_id = %rental.id,
            user_id = %caller.id,
            vehicle_id = %vehicle_id,
            total_cost,
            "Rental created, waiting for payment"
        );

        Ok(CreatedRental { rental, payment })
    }

    /// Cancel a rental that has not been paid yet.
    ///
    /// Allowed only from `Pending`; no inventory was taken, so none is
    /// returned. A later `Expired` notification for its invoice is a
    /// no-op on the rental.
    pub fn cancel_rental(&mut self, caller: &Caller, rental_id: RentalId) -> OpsResult<()> {
        let rental = self
            .state
            .rentals
            .get(rental_id)?
            .ok_or(OpsError::RentalNotFound(rental_id))?;
        if rental.user_id != caller.id {
            return Err(OpsError::Forbidden);
        }
        if rental.status != RentalStatus::Pending {
            return Err(OpsError::InvalidState(rental.status));
        }

        self.state
            .rentals
            .set_status(rental_id, RentalStatus::Cancelled)?;
        info!(rental_id = %rental_id, user_id = %caller.id, "Rental cancelled by user");
        Ok(())
    }

    /// Return a rented vehicle.
    ///
    /// Requires ownership and an `Active` rental. The status transition
    /// and the stock increment commit as one transaction; the return
    /// confirmation goes out afterwards, best effort.
    pub fn return_vehicle(&mut self, caller: &Caller, rental_id: RentalId) -> OpsResult<()> {
        let rental = self
            .state
            .rentals
            .get(rental_id)?
            .ok_or(OpsError::RentalNotFound(rental_id))?;
        if rental.user_id != caller.id {
            return Err(OpsError::Forbidden);
        }
        if rental.status != RentalStatus::Active {
            return Err(OpsError::InvalidState(rental.status));
        }

        let vehicle = self
            .state
            .vehicles
            .get(rental.vehicle_id)?
            .ok_or(OpsError::VehicleNotFound(rental.vehicle_id))?;

        self.state.with_tx(|tx| {
            rentals::set_status(tx, rental_id, RentalStatus::Completed)?;
            vehicles::increment_stock(tx, rental.vehicle_id)
        })?;

        info!(
            rental_id = %rental_id,
            vehicle_id = %rental.vehicle_id,
            "Vehicle returned, rental completed"
        );

        self.notifications().dispatch(OutboundNotification {
            user: caller.id,
            email: caller.email.clone(),
            kind: NotificationKind::ReturnConfirmed,
            subject: "Vehicle Return Confirmation".to_string(),
            body: format!(
                "You have successfully returned {} on {}",
                vehicle.name,
                chrono::Utc::now().date_naive().format(DATE_FORMAT)
            ),
        });

        Ok(())
    }

    /// Best-effort erase of a pending rental whose creation aborted.
    fn rollback_pending_rental(&self, rental_id: RentalId) {
        if let Err(e) = self
            .state
            .with_tx(|tx| rentals::delete_pending(tx, rental_id))
        {
            warn!(
                rental_id = %rental_id,
                error = %e,
                "Failed to roll back pending rental"
            );
        }
    }
}
