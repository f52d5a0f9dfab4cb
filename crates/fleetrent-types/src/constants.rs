//! Service constants.
//!
//! Limits, timing, and wire-format constants shared across the Fleetrent
//! crates.

use crate::Amount;

// =============================================================================
// Pricing
// =============================================================================

/// Minimum amount the payment gateway accepts for an invoice.
pub const MIN_INVOICE_AMOUNT: Amount = 10_000;

/// Maximum rental length in days.
pub const MAX_RENTAL_DAYS: i64 = 365;

// =============================================================================
// Wire formats
// =============================================================================

/// Date format used on the wire for rental dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Prefix of the deterministic external reference sent to the gateway.
pub const EXTERNAL_REF_PREFIX: &str = "rental-";

/// Header carrying the shared webhook secret.
pub const WEBHOOK_TOKEN_HEADER: &str = "x-callback-token";

// =============================================================================
// Timing
// =============================================================================

/// Timeout for gateway HTTP calls: 30 seconds (in milliseconds).
pub const GATEWAY_TIMEOUT_MS: u64 = 30_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_floor_positive() {
        assert!(MIN_INVOICE_AMOUNT > 0);
    }

    #[test]
    fn test_rental_length_bound() {
        assert!(MAX_RENTAL_DAYS >= 1);
    }
}
