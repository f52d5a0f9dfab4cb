//! Data structures for the Fleetrent rental service.
//!
//! This crate provides all data types shared across the Fleetrent crates.
//! It contains no business logic, only type definitions with serialization
//! support.
//!
//! # Module Organization
//!
//! - [`enums`] - Status enumerations (RentalStatus, PaymentStatus, etc.)
//! - [`constants`] - Service constants (limits, timing, wire formats)
//! - [`error`] - Error codes shared across crates
//! - [`vehicle`] - Rentable vehicle (inventory item) types
//! - [`rental`] - Rental record and pricing rules
//! - [`payment`] - Payment record and webhook wire types
//!
//! # Type Conventions
//!
//! - Derive `Debug`, `Clone`, `PartialEq`, `Eq` where appropriate
//! - Derive `Copy` for small types (ids, enums)
//! - Derive `Serialize`, `Deserialize` for wire format
//! - Use `#[serde(rename_all = "snake_case")]` for consistent JSON
//! - Use `#[repr(u8)]` for enums with defined storage values

use serde::{Deserialize, Serialize};

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constants;
pub mod enums;
pub mod error;
pub mod payment;
pub mod rental;
pub mod vehicle;

// Re-export all public types at the crate root for convenience

pub use constants::*;
pub use enums::{DeliveryStatus, NotificationKind, PaymentStatus, RentalStatus};
pub use error::ErrorCode;
pub use payment::{external_reference, PaymentRecord, WebhookNotification};
pub use rental::{rental_cost, rental_days, Rental};
pub use vehicle::Vehicle;

/// Monetary amount in the smallest currency unit.
pub type Amount = u64;

/// Unix timestamp in seconds.
pub type Timestamp = i64;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

id_type! {
    /// Identifier of a registered user.
    ///
    /// Produced by the authentication collaborator and threaded explicitly
    /// through every caller-scoped operation.
    UserId
}

id_type! {
    /// Identifier of a rentable vehicle.
    VehicleId
}

id_type! {
    /// Identifier of a rental.
    RentalId
}

id_type! {
    /// Identifier of a payment record.
    PaymentId
}
