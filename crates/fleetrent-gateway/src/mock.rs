//! Mock invoice gateway for testing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GatewayError, GatewayResult};
use crate::types::{CreateInvoiceRequest, Invoice};
use crate::InvoiceGateway;

/// Mock invoice gateway for testing.
///
/// Maintains in-memory state without any network calls. Every accepted
/// request is recorded; duplicate `external_id`s return the original
/// invoice, matching the idempotency the real gateway provides.
pub struct MockInvoiceGateway {
    /// Requests received, in order.
    requests: Mutex<Vec<CreateInvoiceRequest>>,
    /// Invoices issued, keyed by external_id.
    issued: Mutex<Vec<Invoice>>,
    /// Invoice counter for generating ids.
    counter: AtomicU64,
    /// When set, every call fails with a Network error.
    fail: Mutex<bool>,
}

impl MockInvoiceGateway {
    /// Create a new mock gateway.
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            issued: Mutex::new(Vec::new()),
            counter: AtomicU64::new(1),
            fail: Mutex::new(false),
        }
    }

    /// Make subsequent calls fail with a Network error.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.fail.lock().unwrap() = unreachable;
    }

    /// Number of invoice-creation calls received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<CreateInvoiceRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Find an issued invoice by external reference.
    pub fn issued_for(&self, external_id: &str) -> Option<Invoice> {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.external_id == external_id)
            .cloned()
    }
}

impl Default for MockInvoiceGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvoiceGateway for MockInvoiceGateway {
    async fn create_invoice(&self, request: CreateInvoiceRequest) -> GatewayResult<Invoice> {
        if *self.fail.lock().unwrap() {
            return Err(GatewayError::Network("mock gateway unreachable".to_string()));
        }

        self.requests.lock().unwrap().push(request.clone());

        // Same external_id means the same external charge.
        if let Some(existing) = self.issued_for(&request.external_id) {
            return Ok(existing);
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let invoice = Invoice {
            id: format!("inv-{}", n),
            external_id: request.external_id,
            amount: request.amount,
            status: "PENDING".to_string(),
            invoice_url: format!("https://pay.mock/inv-{}", n),
        };
        self.issued.lock().unwrap().push(invoice.clone());
        Ok(invoice)
    }
}
