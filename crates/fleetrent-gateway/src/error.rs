//! Error types for the payment gateway client.

use fleetrent_types::Amount;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while talking to the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Invoice amount is below the gateway's minimum.
    #[error("invoice amount {amount} below gateway minimum {minimum}")]
    AmountTooLow {
        /// Amount requested
        amount: Amount,
        /// Minimum the gateway accepts
        minimum: Amount,
    },

    /// The gateway answered with a non-success status.
    #[error("gateway rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP status code returned
        status: u16,
        /// Response body, as far as it was readable
        message: String,
    },

    /// The gateway's response body could not be parsed.
    #[error("malformed gateway response: {reason}")]
    MalformedResponse {
        /// Description of what's wrong
        reason: String,
    },

    /// Network/HTTP error reaching the gateway (includes timeouts).
    #[error("gateway communication error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network(err.to_string())
    }
}

impl GatewayError {
    /// Returns true if the operation may succeed on retry.
    ///
    /// Only transport-level failures qualify; rejections and malformed
    /// responses are deterministic.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Network(_))
    }
}
