//! Error types for the operations layer.
//!
//! This module defines the `OpsError` enum used by all operation
//! functions in this crate.

use fleetrent_gateway::GatewayError;
use fleetrent_store::StoreError;
use fleetrent_types::{ErrorCode, RentalId, RentalStatus, VehicleId};
use thiserror::Error;

/// Result type for operations.
pub type OpsResult<T> = std::result::Result<T, OpsError>;

/// Errors that can occur during rental operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpsError {
    // =========================================================================
    // Request Errors
    // =========================================================================
    /// Rental date range is invalid.
    #[error("invalid rental range: {0}")]
    InvalidRange(String),

    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Vehicle not found.
    #[error("vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// Rental not found.
    #[error("rental not found: {0}")]
    RentalNotFound(RentalId),

    /// No payment record matches the reference.
    #[error("payment not found: {0}")]
    PaymentNotFound(String),

    // =========================================================================
    // Access Errors
    // =========================================================================
    /// Webhook token missing or wrong.
    #[error("invalid webhook token")]
    Unauthorized,

    /// Caller does not own the referenced record.
    #[error("caller does not own this rental")]
    Forbidden,

    // =========================================================================
    // State Errors
    // =========================================================================
    /// Operation not allowed in the rental's current state.
    #[error("operation not allowed in rental state: {0}")]
    InvalidState(RentalStatus),

    /// Notification reports a transition the payment cannot take.
    #[error("conflicting payment transition: {0}")]
    Conflict(String),

    /// No units left for the requested vehicle.
    #[error("no units available for vehicle: {0}")]
    OutOfStock(VehicleId),

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// Payment gateway error.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl OpsError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        OpsError::Validation(msg.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        OpsError::Conflict(msg.into())
    }

    /// Get the service error code for this error.
    ///
    /// An HTTP shell maps outcomes through `ErrorCode::http_status`.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            // Request errors
            Self::InvalidRange(_) => ErrorCode::InvalidRange,
            Self::Validation(_) => ErrorCode::Validation,
            Self::VehicleNotFound(_) | Self::RentalNotFound(_) | Self::PaymentNotFound(_) => {
                ErrorCode::NotFound
            }

            // Access errors
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::Forbidden => ErrorCode::Forbidden,

            // State errors
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::OutOfStock(_) => ErrorCode::OutOfStock,

            // Wrapped errors
            Self::Gateway(GatewayError::AmountTooLow { .. }) => ErrorCode::Validation,
            Self::Gateway(_) => ErrorCode::GatewayFailure,
            Self::Store(StoreError::OutOfStock(_)) => ErrorCode::OutOfStock,
            Self::Store(_) => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidRange(_) => {
                "Rental end date must not be before the start date. Use YYYY-MM-DD."
            }
            Self::Validation(_) => "Check the request fields and try again.",
            Self::VehicleNotFound(_) => "Vehicle not found. Browse the catalog for available vehicles.",
            Self::RentalNotFound(_) => "Rental not found. Check the rental id.",
            Self::PaymentNotFound(_) => {
                "No payment matches this reference. The rental may never have been created."
            }
            Self::Unauthorized => "Webhook token rejected. Verify the shared callback secret.",
            Self::Forbidden => "Only the user who created the rental can operate on it.",
            Self::InvalidState(_) => {
                "The rental is not in a state that allows this operation. Check its status first."
            }
            Self::Conflict(_) => {
                "The payment already left the state this notification applies to. No action needed."
            }
            Self::OutOfStock(_) => "All units are currently rented out. Try again later.",
            Self::Gateway(_) => "Payment gateway unavailable. The request left no local state; retry.",
            Self::Store(_) => "Storage failure. Nothing was committed; the request is safe to retry.",
        }
    }

    /// Returns true if this error is transient and the operation may
    /// succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Gateway(e) => e.is_transient(),
            Self::Store(e) => e.is_transient(),
            Self::OutOfStock(_) => true, // Stock may return
            _ => false,
        }
    }
}
