//! Vehicle catalog and stock storage.
//!
//! Stock mutations use conditional atomic updates checked by affected-row
//! count; there is no read-then-write anywhere in this module.

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use fleetrent_types::{Vehicle, VehicleId};

use crate::error::{Result, StoreError};
use crate::traits::VehicleStore;
use crate::types::{NewVehicle, VehicleFilter};
use crate::{column_decode_error, current_timestamp};

/// SQLite-based vehicle store.
pub struct SqliteVehicleStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteVehicleStore {
    /// Create a new vehicle store with the given database connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

/// Columns selected for every vehicle read.
const VEHICLE_COLUMNS: &str =
    "id, name, category, available_units, unit_price, created_at, updated_at";

/// Deserialize a vehicle from a database row.
pub(crate) fn row_to_vehicle(row: &rusqlite::Row) -> rusqlite::Result<Vehicle> {
    let units: i64 = row.get(3)?;
    let units = u32::try_from(units)
        .map_err(|_| column_decode_error(3, format!("negative stock count: {}", units)))?;

    Ok(Vehicle {
        id: VehicleId(row.get(0)?),
        name: row.get(1)?,
        category: row.get(2)?,
        available_units: units,
        unit_price: row.get::<_, i64>(4)? as u64,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl VehicleStore for SqliteVehicleStore {
    fn insert(&mut self, vehicle: NewVehicle) -> Result<Vehicle> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        let now = current_timestamp();

        conn.execute(
            "INSERT INTO vehicles (name, category, available_units, unit_price, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                vehicle.name,
                vehicle.category,
                vehicle.available_units,
                vehicle.unit_price as i64,
                now,
            ],
        )?;
        let id = VehicleId(conn.last_insert_rowid());

        tracing::debug!(vehicle_id = %id, name = %vehicle.name, "Vehicle inserted");

        Ok(Vehicle {
            id,
            name: vehicle.name,
            category: vehicle.category,
            available_units: vehicle.available_units,
            unit_price: vehicle.unit_price,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: VehicleId) -> Result<Option<Vehicle>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let vehicle = conn
            .query_row(
                &format!("SELECT {} FROM vehicles WHERE id = ?1", VEHICLE_COLUMNS),
                [id.0],
                row_to_vehicle,
            )
            .optional()?;
        Ok(vehicle)
    }

    fn list(&self, filter: VehicleFilter) -> Result<Vec<Vehicle>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let mut sql = format!("SELECT {} FROM vehicles", VEHICLE_COLUMNS);
        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(category) = &filter.category {
            clauses.push("category = ?");
            params.push(Box::new(category.clone()));
        }
        if filter.only_available {
            clauses.push("available_units > 0");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_refs.as_slice(), row_to_vehicle)?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

// =============================================================================
// Transactional stock mutations
// =============================================================================

/// Take one unit of stock, failing instead of going negative.
///
/// Runs on the caller's open transaction (a `Transaction` derefs to
/// `Connection`); the caller commits or rolls back. The conditional
/// `available_units > 0` predicate plus the affected-row check is what
/// keeps two confirmations from both taking the last unit.
pub fn decrement_stock(conn: &Connection, id: VehicleId) -> Result<()> {
    let affected = conn.execute(
        "UPDATE vehicles
         SET available_units = available_units - 1, updated_at = ?2
         WHERE id = ?1 AND available_units > 0",
        params![id.0, current_timestamp()],
    )?;

    if affected == 0 {
        // Distinguish a missing vehicle from an exhausted one.
        let exists: bool = conn
            .query_row("SELECT 1 FROM vehicles WHERE id = ?1", [id.0], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if exists {
            return Err(StoreError::OutOfStock(id));
        }
        return Err(StoreError::VehicleNotFound(id));
    }

    Ok(())
}

/// Return one unit of stock.
///
/// Runs on the caller's open transaction; the caller commits or rolls
/// back.
pub fn increment_stock(conn: &Connection, id: VehicleId) -> Result<()> {
    let affected = conn.execute(
        "UPDATE vehicles
         SET available_units = available_units + 1, updated_at = ?2
         WHERE id = ?1",
        params![id.0, current_timestamp()],
    )?;

    if affected == 0 {
        return Err(StoreError::VehicleNotFound(id));
    }

    Ok(())
}
