//! Operations layer for the Fleetrent rental service.
//!
//! This crate provides the orchestration layer that combines the
//! foundation crates (store, gateway, types) to implement the service's
//! business logic: the rental lifecycle, the webhook reconciliation
//! protocol, and caller-scoped queries.
//!
//! # Module Organization
//!
//! - [`error`] - Operation error types
//! - [`config`] - Operations configuration
//! - [`service`] - Main RentalService definition and caller identity
//! - [`rental`] - Rental operations (create, cancel, return)
//! - [`webhook`] - Webhook reconciliation (the consistency core)
//! - [`query`] - Catalog and caller-scoped read operations
//! - [`notify`] - Outbound notification capability and dispatcher
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fleetrent_gateway::{GatewayConfig, HttpInvoiceGateway};
//! use fleetrent_ops::{Caller, LogNotifier, OpsConfig, RentalService};
//! use fleetrent_store::Store;
//!
//! let store = Store::open("/var/lib/fleetrent/fleetrent.db")?;
//! let gateway = HttpInvoiceGateway::new(GatewayConfig::new(
//!     "https://api.gateway.example",
//!     std::env::var("GATEWAY_API_KEY")?,
//! ))?;
//! let mut service = RentalService::new(
//!     store,
//!     Arc::new(gateway),
//!     Arc::new(LogNotifier),
//!     OpsConfig::new(std::env::var("GATEWAY_CALLBACK_TOKEN")?),
//! );
//!
//! let caller = Caller::new(user_id, "user@example.com");
//! let created = service.create_rental(&caller, vehicle_id, start, end).await?;
//! // Client pays created.payment.payment_url out-of-band; the gateway's
//! // webhook drives the rest through service.handle_webhook(...).
//! ```
//!
//! # Consistency Overview
//!
//! Inventory is committed at payment confirmation, not at reservation:
//! an unpaid rental never holds stock, and the losing side of a
//! last-unit race is cancelled with its payment flagged for refund.
//! The webhook handler applies each notification's effect exactly once
//! regardless of retries, and every multi-step mutation runs inside a
//! single store transaction.

// Module declarations
pub mod config;
pub mod error;
pub mod notify;
pub mod query;
pub mod rental;
pub mod service;
pub mod webhook;

// Re-export main types at crate root

// Error types
pub use error::{OpsError, OpsResult};

// Configuration
pub use config::OpsConfig;

// Service
pub use service::{Caller, CreatedRental, RentalService};

// Webhook reconciliation
pub use webhook::ReconcileOutcome;

// Notifications
pub use notify::{
    LogNotifier, MockNotifier, NotificationDispatcher, Notifier, NotifyError,
    OutboundNotification,
};
