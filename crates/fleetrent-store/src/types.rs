//! Store-specific types.
//!
//! This module defines types used by the storage layer that are not
//! part of the core domain types.

use fleetrent_types::{
    Amount, DeliveryStatus, NotificationKind, PaymentRecord, Rental, RentalId, Timestamp, UserId,
    Vehicle, VehicleId,
};
use serde::{Deserialize, Serialize};

/// Filter criteria for listing vehicles.
///
/// All fields are optional. When a field is `None` (or false), no
/// filtering is applied for that criterion.
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    /// Filter by catalog category.
    pub category: Option<String>,
    /// Only return vehicles with at least one unit available.
    pub only_available: bool,
}

impl VehicleFilter {
    /// Create a new empty filter (matches all vehicles).
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Only match vehicles that are in stock.
    pub fn only_available(mut self) -> Self {
        self.only_available = true;
        self
    }
}

/// Parameters for inserting a vehicle.
#[derive(Debug, Clone)]
pub struct NewVehicle {
    /// Display name.
    pub name: String,
    /// Catalog category.
    pub category: String,
    /// Initial unit count.
    pub available_units: u32,
    /// Price per rental day.
    pub unit_price: Amount,
}

/// Parameters for inserting a rental.
///
/// The caller has already validated the range and computed the cost;
/// rentals are always inserted in `Pending`.
#[derive(Debug, Clone)]
pub struct NewRental {
    pub user_id: UserId,
    pub vehicle_id: VehicleId,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub total_cost: Amount,
}

/// Parameters for inserting a payment record.
///
/// Mirrors the invoice the gateway issued; payments are always inserted
/// in `Pending`.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub rental_id: RentalId,
    pub invoice_id: String,
    pub external_reference: String,
    pub amount: Amount,
    pub payment_url: String,
    pub payer_email: String,
}

/// Audit row for an outbound notification dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationRecord {
    /// Row identity.
    pub id: i64,
    /// Recipient user.
    pub user_id: UserId,
    /// What the notification was about.
    pub kind: NotificationKind,
    /// Dispatch outcome.
    pub delivery: DeliveryStatus,
    /// Rendered message body.
    pub message: String,
    /// Dispatch time, unix seconds.
    pub created_at: Timestamp,
}

/// A rental joined with its vehicle, for caller-facing listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RentalView {
    pub rental: Rental,
    pub vehicle: Vehicle,
}

/// A payment joined with its rental and vehicle, for caller-facing
/// listings. Ownership is enforced by the query, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaymentView {
    pub payment: PaymentRecord,
    pub rental: Rental,
    pub vehicle: Vehicle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builder() {
        let filter = VehicleFilter::new().with_category("suv").only_available();
        assert_eq!(filter.category.as_deref(), Some("suv"));
        assert!(filter.only_available);
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = VehicleFilter::new();
        assert!(filter.category.is_none());
        assert!(!filter.only_available);
    }
}
