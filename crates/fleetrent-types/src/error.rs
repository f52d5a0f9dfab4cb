//! Error codes shared across the Fleetrent crates.
//!
//! Operation errors in the other crates map onto these codes so an HTTP
//! shell can translate outcomes without inspecting concrete error types.

use serde::{Deserialize, Serialize};

/// Service-level error codes.
///
/// Grouped by range:
/// - `0x0001..=0x00FF` request errors (malformed or unresolvable input)
/// - `0x0100..=0x01FF` access errors
/// - `0x0200..=0x02FF` state errors (a lifecycle rule was violated)
/// - everything else internal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
#[non_exhaustive]
pub enum ErrorCode {
    // =========================================================================
    // Request Errors (0x0001 - 0x00FF)
    // =========================================================================
    /// Rental date range is invalid (end before start, or too long)
    InvalidRange = 0x0001,
    /// Input failed validation (bad format, missing field, amount too low)
    Validation = 0x0002,
    /// Referenced vehicle, rental, or payment does not exist
    NotFound = 0x0003,

    // =========================================================================
    // Access Errors (0x0100 - 0x01FF)
    // =========================================================================
    /// Webhook token missing or wrong
    Unauthorized = 0x0100,
    /// Caller does not own the referenced record
    Forbidden = 0x0101,

    // =========================================================================
    // State Errors (0x0200 - 0x02FF)
    // =========================================================================
    /// Operation not allowed in the rental's current state
    InvalidState = 0x0200,
    /// Notification reports a transition the payment cannot take
    Conflict = 0x0201,
    /// No units left for the requested vehicle
    OutOfStock = 0x0202,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Payment gateway unreachable or returned garbage
    GatewayFailure = 0x0300,
    /// Storage or transaction failure; nothing partially committed
    Internal = 0xFFFF,
}

impl ErrorCode {
    /// Returns true if this is a request error (0x0001-0x00FF)
    pub fn is_request_error(&self) -> bool {
        let code = *self as u16;
        (0x0001..=0x00FF).contains(&code)
    }

    /// Returns true if this is an access error (0x0100-0x01FF)
    pub fn is_access_error(&self) -> bool {
        let code = *self as u16;
        (0x0100..=0x01FF).contains(&code)
    }

    /// Returns true if this is a state error (0x0200-0x02FF)
    pub fn is_state_error(&self) -> bool {
        let code = *self as u16;
        (0x0200..=0x02FF).contains(&code)
    }

    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// HTTP status an API layer should answer with.
    ///
    /// `Internal` and `GatewayFailure` are safe for the caller to retry:
    /// nothing partial was committed.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRange | Self::Validation | Self::InvalidState => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict | Self::OutOfStock => 409,
            Self::GatewayFailure | Self::Internal => 500,
        }
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        if self.is_request_error() {
            "Request"
        } else if self.is_access_error() {
            "Access"
        } else if self.is_state_error() {
            "State"
        } else {
            "Internal"
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidRange => write!(f, "INVALID_RANGE"),
            ErrorCode::Validation => write!(f, "VALIDATION"),
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::Forbidden => write!(f, "FORBIDDEN"),
            ErrorCode::InvalidState => write!(f, "INVALID_STATE"),
            ErrorCode::Conflict => write!(f, "CONFLICT"),
            ErrorCode::OutOfStock => write!(f, "OUT_OF_STOCK"),
            ErrorCode::GatewayFailure => write!(f, "GATEWAY_FAILURE"),
            ErrorCode::Internal => write!(f, "INTERNAL"),
        }
    }
}
