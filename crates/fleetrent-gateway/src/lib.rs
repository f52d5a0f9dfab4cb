//! Payment gateway integration for the Fleetrent rental service.
//!
//! This crate implements the outbound half of the payment flow: creating
//! a payable invoice at the external gateway when a rental is requested.
//! The inbound half (the asynchronous payment-status webhook) is handled
//! by the reconciler in `fleetrent-ops`; the wire types it consumes live
//! in `fleetrent-types`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  create_invoice    ┌──────────────┐
//! │  Fleetrent  │ ──────────────────→│  Payment     │
//! │  (ops)      │ ←────────────────  │  Gateway     │
//! │             │  invoice + URL     │              │
//! │             │                    │              │
//! │             │        payer pays out-of-band     │
//! │             │                    │              │
//! │  webhook    │  POST status       │              │
//! │  reconciler │ ←──────────────────│              │
//! └─────────────┘                    └──────────────┘
//! ```
//!
//! # Components
//!
//! - **[`types`]**: invoice API request/response shapes and client config
//! - **[`client`]**: `InvoiceGateway` trait and the reqwest-based client
//! - **[`mock`]**: in-memory gateway for tests
//! - **[`error`]**: error types
//!
//! The `external_id` on every invoice is derived deterministically from
//! the rental identity, so retried creation calls never produce duplicate
//! external charges, and webhook notifications can always be correlated
//! back to exactly one payment record.

pub mod client;
pub mod error;
pub mod mock;
pub mod types;

// Re-export main types
pub use client::{HttpInvoiceGateway, InvoiceGateway};
pub use error::{GatewayError, GatewayResult};
pub use mock::MockInvoiceGateway;
pub use types::{CreateInvoiceRequest, GatewayConfig, Invoice, API_KEY_HEADER, INVOICES_PATH};
