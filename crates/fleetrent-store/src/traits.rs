//! Trait definitions for storage components.
//!
//! This module defines the trait contracts for all storage components.
//! Implementations may vary (the defaults use SQLite) but must satisfy
//! these interfaces.
//!
//! Multi-step mutations that must commit atomically (payment confirmation,
//! returns) are not part of these traits; they are composed from the `_tx`
//! functions in each module inside a single [`crate::Store::with_tx`]
//! transaction.

use fleetrent_types::{
    DeliveryStatus, NotificationKind, PaymentId, PaymentRecord, PaymentStatus, Rental, RentalId,
    RentalStatus, UserId, Vehicle, VehicleId,
};

use crate::error::Result;
use crate::types::{NewPayment, NewRental, NewVehicle, NotificationRecord, VehicleFilter};

// =============================================================================
// Vehicle Storage
// =============================================================================

/// Trait for the vehicle catalog and stock counts.
///
/// Stock is read from the row on every call; implementations must not
/// cache counts across requests.
pub trait VehicleStore {
    /// Insert a vehicle and return the stored row.
    fn insert(&mut self, vehicle: NewVehicle) -> Result<Vehicle>;

    /// Load a vehicle by id.
    ///
    /// Returns `None` if the vehicle doesn't exist.
    fn get(&self, id: VehicleId) -> Result<Option<Vehicle>>;

    /// List vehicles matching filter criteria.
    fn list(&self, filter: VehicleFilter) -> Result<Vec<Vehicle>>;
}

// =============================================================================
// Rental Storage
// =============================================================================

/// Trait for rental records.
pub trait RentalStore {
    /// Insert a rental in `Pending` and return the stored row.
    fn insert(&mut self, rental: NewRental) -> Result<Rental>;

    /// Load a rental by id.
    ///
    /// Returns `None` if the rental doesn't exist.
    fn get(&self, id: RentalId) -> Result<Option<Rental>>;

    /// List all rentals belonging to a user, newest first.
    fn list_for_user(&self, user: UserId) -> Result<Vec<Rental>>;

    /// Set the rental status.
    ///
    /// Returns an error if the rental doesn't exist. Callers are
    /// responsible for transition legality.
    fn set_status(&mut self, id: RentalId, status: RentalStatus) -> Result<()>;
}

// =============================================================================
// Payment Storage
// =============================================================================

/// Trait for payment records.
pub trait PaymentStore {
    /// Insert a payment record in `Pending` and return the stored row.
    fn insert(&mut self, payment: NewPayment) -> Result<PaymentRecord>;

    /// Load a payment by id.
    ///
    /// Returns `None` if the payment doesn't exist.
    fn get(&self, id: PaymentId) -> Result<Option<PaymentRecord>>;

    /// Load a payment by its external reference (idempotency key).
    ///
    /// Returns `None` if no payment matches.
    fn get_by_reference(&self, reference: &str) -> Result<Option<PaymentRecord>>;

    /// Set the payment status.
    ///
    /// Returns an error if the payment doesn't exist.
    fn set_status(&mut self, id: PaymentId, status: PaymentStatus) -> Result<()>;
}

// =============================================================================
// Notification Storage
// =============================================================================

/// Trait for notification audit rows.
pub trait NotificationStore {
    /// Record a dispatch attempt and return the stored row.
    fn record(
        &mut self,
        user: UserId,
        kind: NotificationKind,
        delivery: DeliveryStatus,
        message: &str,
    ) -> Result<NotificationRecord>;

    /// List all notification rows for a user, newest first.
    fn list_for_user(&self, user: UserId) -> Result<Vec<NotificationRecord>>;
}
