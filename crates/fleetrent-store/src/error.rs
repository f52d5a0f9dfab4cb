//! Error types for the storage layer.

use fleetrent_types::{RentalId, VehicleId};
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Vehicle not found in store.
    #[error("vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// Rental not found in store.
    #[error("rental not found: {0}")]
    RentalNotFound(RentalId),

    /// No payment record matches the external reference.
    #[error("payment not found for reference: {0}")]
    PaymentNotFound(String),

    /// Conditional decrement matched no row with stock left.
    #[error("no units available for vehicle: {0}")]
    OutOfStock(VehicleId),

    /// Stored value could not be decoded into a domain type.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Schema initialization error.
    #[error("schema error: {0}")]
    Schema(String),

    /// Lock poisoning error.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        StoreError::InvalidData(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        StoreError::Schema(msg.into())
    }

    /// Create a lock poisoned error.
    pub fn lock_poisoned(msg: impl Into<String>) -> Self {
        StoreError::LockPoisoned(msg.into())
    }

    /// Returns true if the operation may succeed on retry.
    ///
    /// SQLite busy/locked conditions clear once the competing writer
    /// finishes; everything else is deterministic.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}
