//! HTTP invoice client.
//!
//! Talks to the payment gateway's invoice API. The gateway handles the
//! actual collection of money; we only create invoices and receive status
//! notifications (handled elsewhere, by the webhook reconciler).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use fleetrent_types::constants::MIN_INVOICE_AMOUNT;

use crate::error::{GatewayError, GatewayResult};
use crate::types::{CreateInvoiceRequest, GatewayConfig, Invoice, API_KEY_HEADER, INVOICES_PATH};

/// Capability interface for creating payable invoices.
///
/// The production implementation is [`HttpInvoiceGateway`]; tests use
/// [`crate::MockInvoiceGateway`]. Callers must treat a failure as "no
/// invoice exists" and abort the enclosing operation without local side
/// effects.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    /// Create a payable invoice.
    ///
    /// `request.external_id` must be derived deterministically from the
    /// rental identity so retries do not create duplicate charges.
    async fn create_invoice(&self, request: CreateInvoiceRequest) -> GatewayResult<Invoice>;
}

/// Client for the gateway's invoice HTTP API.
#[derive(Clone)]
pub struct HttpInvoiceGateway {
    /// HTTP client
    client: Client,
    /// Gateway configuration
    config: GatewayConfig,
}

impl HttpInvoiceGateway {
    /// Create a new gateway client.
    ///
    /// The timeout from the config bounds every request; a hung gateway
    /// surfaces as a `Network` error instead of blocking the caller.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: GatewayConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    /// Get the gateway's base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

#[async_trait]
impl InvoiceGateway for HttpInvoiceGateway {
    async fn create_invoice(&self, request: CreateInvoiceRequest) -> GatewayResult<Invoice> {
        if request.amount < MIN_INVOICE_AMOUNT {
            return Err(GatewayError::AmountTooLow {
                amount: request.amount,
                minimum: MIN_INVOICE_AMOUNT,
            });
        }

        let url = format!("{}{}", self.config.base_url, INVOICES_PATH);
        debug!(url = %url, external_id = %request.external_id, "Creating gateway invoice");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gateway rejected invoice creation");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let invoice: Invoice = response.json().await.map_err(|e| {
            GatewayError::MalformedResponse {
                reason: format!("failed to parse invoice response: {}", e),
            }
        })?;

        info!(
            invoice_id = %invoice.id,
            external_id = %invoice.external_id,
            amount = invoice.amount,
            "Gateway invoice created"
        );

        Ok(invoice)
    }
}

impl std::fmt::Debug for HttpInvoiceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the api key.
        f.debug_struct("HttpInvoiceGateway")
            .field("base_url", &self.config.base_url)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish()
    }
}
