//! SQLite storage layer for the Fleetrent rental service.
//!
//! This crate provides persistence for all service state:
//!
//! - **Vehicle catalog** (SQLite): rentable vehicles and their stock counts
//! - **Rentals** (SQLite): reservation records and lifecycle state
//! - **Payments** (SQLite): gateway invoice records keyed by external reference
//! - **Notifications** (SQLite): audit rows for outbound dispatch attempts
//!
//! # Consistency Model
//!
//! The database is the only synchronization point between request workers.
//! Simple reads and single-row writes go through the per-component stores,
//! each locking the shared connection for the duration of one call.
//! Multi-step mutations that must be all-or-nothing (payment confirmation,
//! vehicle return) are composed from the `_tx` helpers in each module and
//! executed inside a single [`Store::with_tx`] transaction: any error rolls
//! back every step, including the stock mutation.
//!
//! Stock never goes negative: the decrement is a conditional
//! `UPDATE ... WHERE available_units > 0` checked by affected-row count,
//! not a read-then-write.
//!
//! # Trait-Based Design
//!
//! The per-component stores are defined as traits in [`traits`], allowing
//! for alternative implementations. The defaults use SQLite.
//!
//! # Example
//!
//! ```no_run
//! use fleetrent_store::{Store, NewVehicle, VehicleStore};
//!
//! let mut store = Store::open("/var/lib/fleetrent/fleetrent.db")
//!     .expect("Failed to open store");
//!
//! let vehicle = store.vehicles.insert(NewVehicle {
//!     name: "Toyota Avanza".to_string(),
//!     category: "mpv".to_string(),
//!     available_units: 3,
//!     unit_price: 100_000,
//! }).expect("Failed to insert vehicle");
//!
//! assert!(vehicle.in_stock());
//! ```

// Module declarations
pub mod error;
pub mod notifications;
pub mod payments;
pub mod rentals;
pub mod schema;
pub mod traits;
pub mod types;
pub mod vehicles;
pub mod views;

// Re-export error types
pub use error::{Result, StoreError};

// Re-export traits
pub use traits::{NotificationStore, PaymentStore, RentalStore, VehicleStore};

// Re-export types
pub use types::{
    NewPayment, NewRental, NewVehicle, NotificationRecord, PaymentView, RentalView, VehicleFilter,
};

// Re-export implementations
pub use notifications::SqliteNotificationStore;
pub use payments::SqlitePaymentStore;
pub use rentals::SqliteRentalStore;
pub use vehicles::SqliteVehicleStore;

use std::path::Path;
use std::sync::{Arc, Mutex};

use fleetrent_types::Timestamp;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Current unix timestamp in seconds.
///
/// Used for the `created_at`/`updated_at` audit columns.
pub fn current_timestamp() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as Timestamp)
        .unwrap_or(0)
}

/// Build a rusqlite conversion error for an undecodable column.
pub(crate) fn column_decode_error(index: usize, message: impl Into<String>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        message.into().into(),
    )
}

/// Complete service state with all storage components.
///
/// This struct composes all storage components over one shared SQLite
/// connection and provides the transaction scope for multi-step mutations.
pub struct Store {
    /// Vehicle catalog and stock counts.
    pub vehicles: SqliteVehicleStore,
    /// Rental records.
    pub rentals: SqliteRentalStore,
    /// Payment records.
    pub payments: SqlitePaymentStore,
    /// Notification audit rows.
    pub notifications: SqliteNotificationStore,
    /// Shared database connection.
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open the store at the given database path.
    ///
    /// Initializes the schema if needed.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        tracing::info!(db_path = %db_path.display(), "Opening store database");
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store.
    ///
    /// Useful for tests and for embedding without a data directory.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        Ok(Self {
            vehicles: SqliteVehicleStore::new(Arc::clone(&conn)),
            rentals: SqliteRentalStore::new(Arc::clone(&conn)),
            payments: SqlitePaymentStore::new(Arc::clone(&conn)),
            notifications: SqliteNotificationStore::new(Arc::clone(&conn)),
            conn,
        })
    }

    /// Get a reference to the shared database connection.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// Run a closure inside one immediate-mode transaction.
    ///
    /// Commits only if the closure succeeds; any error rolls back every
    /// statement the closure executed. Immediate mode takes the write lock
    /// up front, so a competing confirmation for the same row serializes
    /// here instead of failing mid-transaction.
    pub fn with_tx<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::VehicleStore;
    use crate::types::NewVehicle;
    use tempfile::TempDir;

    #[test]
    fn test_store_open_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("fleetrent.db");

        let store = Store::open(&db_path);
        assert!(store.is_ok());
        assert!(db_path.exists());
    }

    #[test]
    fn test_store_reopen_preserves_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("fleetrent.db");

        let id = {
            let mut store = Store::open(&db_path).unwrap();
            store
                .vehicles
                .insert(NewVehicle {
                    name: "Honda CR-V".to_string(),
                    category: "suv".to_string(),
                    available_units: 2,
                    unit_price: 250_000,
                })
                .unwrap()
                .id
        };

        let store = Store::open(&db_path).unwrap();
        let vehicle = store.vehicles.get(id).unwrap().unwrap();
        assert_eq!(vehicle.name, "Honda CR-V");
    }

    #[test]
    fn test_with_tx_commits_on_ok() {
        let store = Store::open_in_memory().unwrap();

        store
            .with_tx(|tx| {
                tx.execute(
                    "INSERT INTO vehicles (name, category, available_units, unit_price, created_at, updated_at)
                     VALUES ('Test', 'suv', 1, 100, 0, 0)",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        let count: i64 = {
            let conn = store.connection();
            let guard = conn.lock().unwrap();
            guard
                .query_row("SELECT COUNT(*) FROM vehicles", [], |row| row.get(0))
                .unwrap()
        };
        assert_eq!(count, 1);
    }

    #[test]
    fn test_with_tx_rolls_back_on_err() {
        let store = Store::open_in_memory().unwrap();

        let result: Result<()> = store.with_tx(|tx| {
            tx.execute(
                "INSERT INTO vehicles (name, category, available_units, unit_price, created_at, updated_at)
                 VALUES ('Test', 'suv', 1, 100, 0, 0)",
                [],
            )?;
            Err(StoreError::invalid_data("forced failure"))
        });
        assert!(result.is_err());

        let count: i64 = {
            let conn = store.connection();
            let guard = conn.lock().unwrap();
            guard
                .query_row("SELECT COUNT(*) FROM vehicles", [], |row| row.get(0))
                .unwrap()
        };
        assert_eq!(count, 0);
    }

    #[test]
    fn test_current_timestamp_monotonic_enough() {
        let a = current_timestamp();
        let b = current_timestamp();
        assert!(b >= a);
        assert!(a > 1_600_000_000, "timestamp should be in the present era");
    }
}
