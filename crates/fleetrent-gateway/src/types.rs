//! Gateway wire types.
//!
//! Request and response shapes for the gateway's invoice API, plus the
//! client configuration.

use fleetrent_types::constants::GATEWAY_TIMEOUT_MS;
use fleetrent_types::Amount;
use serde::{Deserialize, Serialize};

/// Header carrying the API key on outbound gateway calls.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Path of the invoice-creation endpoint, relative to the base URL.
pub const INVOICES_PATH: &str = "/v2/invoices";

/// Configuration for the gateway client.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway API.
    pub base_url: String,
    /// Secret API key for outbound calls.
    pub api_key: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl GatewayConfig {
    /// Create a config with the default timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_ms: GATEWAY_TIMEOUT_MS,
        }
    }

    /// Set the request timeout in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Request body for invoice creation.
///
/// `external_id` is the deterministic idempotency key: retried calls for
/// the same rental carry the same value, so the gateway deduplicates the
/// charge on its side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateInvoiceRequest {
    /// Idempotency key (`rental-{id}`).
    pub external_id: String,
    /// Invoice amount, smallest currency unit.
    pub amount: Amount,
    /// Payer's email, used by the gateway for the checkout page.
    pub payer_email: String,
    /// Human-readable invoice description.
    pub description: String,
}

/// A payable invoice as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invoice {
    /// Gateway-assigned invoice id.
    pub id: String,
    /// Our idempotency key, echoed back.
    pub external_id: String,
    /// Invoice amount, smallest currency unit.
    pub amount: Amount,
    /// Invoice status in the gateway's vocabulary (e.g. "PENDING").
    pub status: String,
    /// Hosted checkout page for the payer.
    pub invoice_url: String,
}
