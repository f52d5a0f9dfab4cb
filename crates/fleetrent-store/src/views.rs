//! Read-only projections composing rentals, vehicles, and payments.
//!
//! Every method runs its reads under one connection lock, so a view is
//! consistent as of a single snapshot. Ownership scoping happens in the
//! SQL, not in the caller.

use chrono::NaiveDate;
use rusqlite::OptionalExtension;

use fleetrent_types::{
    constants::DATE_FORMAT, PaymentId, PaymentRecord, PaymentStatus, Rental, RentalId,
    RentalStatus, UserId, Vehicle, VehicleId,
};

use crate::column_decode_error;
use crate::error::{Result, StoreError};
use crate::types::{PaymentView, RentalView};
use crate::Store;

const RENTAL_VIEW_SELECT: &str = "SELECT \
     r.id, r.user_id, r.vehicle_id, r.start_date, r.end_date, r.total_cost, r.status, \
     r.created_at, r.updated_at, \
     v.id, v.name, v.category, v.available_units, v.unit_price, v.created_at, v.updated_at \
     FROM rentals r JOIN vehicles v ON v.id = r.vehicle_id";

const PAYMENT_VIEW_SELECT: &str = "SELECT \
     p.id, p.rental_id, p.invoice_id, p.external_reference, p.amount, p.status, p.payment_url, \
     p.payer_email, p.requires_refund, p.created_at, p.updated_at, \
     r.id, r.user_id, r.vehicle_id, r.start_date, r.end_date, r.total_cost, r.status, \
     r.created_at, r.updated_at, \
     v.id, v.name, v.category, v.available_units, v.unit_price, v.created_at, v.updated_at \
     FROM payments p \
     JOIN rentals r ON r.id = p.rental_id \
     JOIN vehicles v ON v.id = r.vehicle_id";

fn date_at(row: &rusqlite::Row, index: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(index)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| column_decode_error(index, format!("bad date '{}': {}", raw, e)))
}

/// Read a rental starting at `base`, followed by its vehicle columns.
fn rental_at(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Rental> {
    let status_raw: u8 = row.get(base + 6)?;
    let status = RentalStatus::from_u8(status_raw).ok_or_else(|| {
        column_decode_error(base + 6, format!("unknown rental status {}", status_raw))
    })?;

    Ok(Rental {
        id: RentalId(row.get(base)?),
        user_id: UserId(row.get(base + 1)?),
        vehicle_id: VehicleId(row.get(base + 2)?),
        start_date: date_at(row, base + 3)?,
        end_date: date_at(row, base + 4)?,
        total_cost: row.get::<_, i64>(base + 5)? as u64,
        status,
        created_at: row.get(base + 7)?,
        updated_at: row.get(base + 8)?,
    })
}

/// Read a vehicle starting at `base`.
fn vehicle_at(row: &rusqlite::Row, base: usize) -> rusqlite::Result<Vehicle> {
    let units: i64 = row.get(base + 3)?;
    let units = u32::try_from(units)
        .map_err(|_| column_decode_error(base + 3, format!("negative stock count: {}", units)))?;

    Ok(Vehicle {
        id: VehicleId(row.get(base)?),
        name: row.get(base + 1)?,
        category: row.get(base + 2)?,
        available_units: units,
        unit_price: row.get::<_, i64>(base + 4)? as u64,
        created_at: row.get(base + 5)?,
        updated_at: row.get(base + 6)?,
    })
}

fn row_to_rental_view(row: &rusqlite::Row) -> rusqlite::Result<RentalView> {
    Ok(RentalView {
        rental: rental_at(row, 0)?,
        vehicle: vehicle_at(row, 9)?,
    })
}

/// Read a payment starting at `base`.
fn payment_at(row: &rusqlite::Row, base: usize) -> rusqlite::Result<PaymentRecord> {
    let status_raw: u8 = row.get(base + 5)?;
    let status = PaymentStatus::from_u8(status_raw).ok_or_else(|| {
        column_decode_error(base + 5, format!("unknown payment status {}", status_raw))
    })?;

    Ok(PaymentRecord {
        id: PaymentId(row.get(base)?),
        rental_id: RentalId(row.get(base + 1)?),
        invoice_id: row.get(base + 2)?,
        external_reference: row.get(base + 3)?,
        amount: row.get::<_, i64>(base + 4)? as u64,
        status,
        payment_url: row.get(base + 6)?,
        payer_email: row.get(base + 7)?,
        requires_refund: row.get::<_, i64>(base + 8)? != 0,
        created_at: row.get(base + 9)?,
        updated_at: row.get(base + 10)?,
    })
}

fn row_to_payment_view(row: &rusqlite::Row) -> rusqlite::Result<PaymentView> {
    Ok(PaymentView {
        payment: payment_at(row, 0)?,
        rental: rental_at(row, 11)?,
        vehicle: vehicle_at(row, 20)?,
    })
}

impl Store {
    /// List a user's rentals joined with their vehicles, newest first.
    pub fn rental_views_for_user(&self, user: UserId) -> Result<Vec<RentalView>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE r.user_id = ?1 ORDER BY r.id DESC",
            RENTAL_VIEW_SELECT
        ))?;
        let rows = stmt.query_map([user.0], row_to_rental_view)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// List a user's payments joined through their rentals, newest first.
    ///
    /// The join through `rentals` is what scopes the result to the caller.
    pub fn payment_views_for_user(&self, user: UserId) -> Result<Vec<PaymentView>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE r.user_id = ?1 ORDER BY p.id DESC",
            PAYMENT_VIEW_SELECT
        ))?;
        let rows = stmt.query_map([user.0], row_to_payment_view)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Load one payment view, scoped to the owning user.
    ///
    /// Returns `None` both for a missing payment and for someone else's
    /// payment; callers cannot distinguish the two.
    pub fn payment_view_for_user(
        &self,
        user: UserId,
        payment: PaymentId,
    ) -> Result<Option<PaymentView>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let view = conn
            .query_row(
                &format!(
                    "{} WHERE p.id = ?1 AND r.user_id = ?2",
                    PAYMENT_VIEW_SELECT
                ),
                [payment.0, user.0],
                row_to_payment_view,
            )
            .optional()?;
        Ok(view)
    }
}
