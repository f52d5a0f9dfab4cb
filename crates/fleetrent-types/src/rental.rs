//! Rental record and pricing rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::RentalStatus;
use crate::{Amount, RentalId, Timestamp, UserId, VehicleId};

/// A single reservation of one vehicle unit for a date range.
///
/// Rentals are never deleted; `Completed` and `Cancelled` are terminal.
/// Inventory is taken only on the `Pending → Active` transition, so an
/// unpaid rental never holds stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rental {
    /// Row identity.
    pub id: RentalId,
    /// Owning user.
    pub user_id: UserId,
    /// Rented vehicle.
    pub vehicle_id: VehicleId,
    /// First rental day (inclusive).
    pub start_date: NaiveDate,
    /// Last rental day. `end_date >= start_date` always holds.
    pub end_date: NaiveDate,
    /// Price for the whole range: `unit_price × max(days, 1)`.
    pub total_cost: Amount,
    /// Lifecycle state.
    pub status: RentalStatus,
    /// Creation time, unix seconds.
    pub created_at: Timestamp,
    /// Last mutation time, unix seconds. Monotonic per row.
    pub updated_at: Timestamp,
}

impl Rental {
    /// True while the rental holds an inventory unit.
    pub fn is_active(&self) -> bool {
        self.status == RentalStatus::Active
    }
}

/// Number of billable days for a date range.
///
/// A same-day rental (`end == start`) still charges one day; longer ranges
/// charge the whole-day difference. Callers must have rejected
/// `end < start` already.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(1)
}

/// Total cost for a rental: `unit_price × max(days, 1)`.
pub fn rental_cost(unit_price: Amount, start: NaiveDate, end: NaiveDate) -> Amount {
    unit_price * rental_days(start, end) as Amount
}
