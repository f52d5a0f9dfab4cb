//! Rental record storage.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use fleetrent_types::{constants::DATE_FORMAT, Rental, RentalId, RentalStatus, UserId, VehicleId};

use crate::error::{Result, StoreError};
use crate::traits::RentalStore;
use crate::types::NewRental;
use crate::{column_decode_error, current_timestamp};

/// SQLite-based rental store.
pub struct SqliteRentalStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRentalStore {
    /// Create a new rental store with the given database connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

/// Columns selected for every rental read.
const RENTAL_COLUMNS: &str =
    "id, user_id, vehicle_id, start_date, end_date, total_cost, status, created_at, updated_at";

fn parse_date(index: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| column_decode_error(index, format!("bad date '{}': {}", raw, e)))
}

/// Deserialize a rental from a database row.
pub(crate) fn row_to_rental(row: &rusqlite::Row) -> rusqlite::Result<Rental> {
    let start_raw: String = row.get(3)?;
    let end_raw: String = row.get(4)?;
    let status_raw: u8 = row.get(6)?;
    let status = RentalStatus::from_u8(status_raw)
        .ok_or_else(|| column_decode_error(6, format!("unknown rental status {}", status_raw)))?;

    Ok(Rental {
        id: RentalId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        vehicle_id: VehicleId(row.get(2)?),
        start_date: parse_date(3, &start_raw)?,
        end_date: parse_date(4, &end_raw)?,
        total_cost: row.get::<_, i64>(5)? as u64,
        status,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl RentalStore for SqliteRentalStore {
    fn insert(&mut self, rental: NewRental) -> Result<Rental> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        let now = current_timestamp();

        conn.execute(
            "INSERT INTO rentals (user_id, vehicle_id, start_date, end_date, total_cost, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                rental.user_id.0,
                rental.vehicle_id.0,
                rental.start_date.format(DATE_FORMAT).to_string(),
                rental.end_date.format(DATE_FORMAT).to_string(),
                rental.total_cost as i64,
                RentalStatus::Pending as u8,
                now,
            ],
        )?;
        let id = RentalId(conn.last_insert_rowid());

        tracing::debug!(rental_id = %id, user_id = %rental.user_id, "Rental inserted");

        Ok(Rental {
            id,
            user_id: rental.user_id,
            vehicle_id: rental.vehicle_id,
            start_date: rental.start_date,
            end_date: rental.end_date,
            total_cost: rental.total_cost,
            status: RentalStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: RentalId) -> Result<Option<Rental>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        get_rental(&conn, id)
    }

    fn list_for_user(&self, user: UserId) -> Result<Vec<Rental>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM rentals WHERE user_id = ?1 ORDER BY id DESC",
            RENTAL_COLUMNS
        ))?;
        let rows = stmt.query_map([user.0], row_to_rental)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn set_status(&mut self, id: RentalId, status: RentalStatus) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        set_status(&conn, id, status)
    }
}

// =============================================================================
// Transactional helpers
// =============================================================================

/// Load a rental on the caller's connection or open transaction.
pub fn get_rental(conn: &Connection, id: RentalId) -> Result<Option<Rental>> {
    let rental = conn
        .query_row(
            &format!("SELECT {} FROM rentals WHERE id = ?1", RENTAL_COLUMNS),
            [id.0],
            row_to_rental,
        )
        .optional()?;
    Ok(rental)
}

/// Write a rental status on the caller's connection or open transaction.
///
/// Transition legality is the caller's concern; this only refuses a
/// missing row.
pub fn set_status(conn: &Connection, id: RentalId, status: RentalStatus) -> Result<()> {
    let affected = conn.execute(
        "UPDATE rentals SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.0, status as u8, current_timestamp()],
    )?;
    if affected == 0 {
        return Err(StoreError::RentalNotFound(id));
    }
    Ok(())
}

/// Erase a pending rental that never completed creation.
///
/// Compensation for a failed invoice call: the aborted creation must
/// leave no local state. Refuses to touch a rental that has left
/// `Pending`; completed lifecycles are never deleted.
pub fn delete_pending(conn: &Connection, id: RentalId) -> Result<()> {
    let affected = conn.execute(
        "DELETE FROM rentals WHERE id = ?1 AND status = ?2",
        params![id.0, RentalStatus::Pending as u8],
    )?;
    if affected == 0 {
        return Err(StoreError::RentalNotFound(id));
    }
    Ok(())
}
