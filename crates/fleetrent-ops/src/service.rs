//! Main RentalService definition.
//!
//! `RentalService` composes the store, the payment gateway capability,
//! and the outbound notification dispatcher. The operation
//! implementations live in the sibling modules (`rental`, `webhook`,
//! `query`), all as `impl RentalService` blocks.

use std::sync::Arc;

use fleetrent_gateway::InvoiceGateway;
use fleetrent_store::{SqliteNotificationStore, Store};
use fleetrent_types::{PaymentRecord, Rental, UserId};

use crate::config::OpsConfig;
use crate::notify::{NotificationDispatcher, Notifier};

/// Authenticated caller identity.
///
/// Produced by the authentication collaborator (out of scope here) and
/// threaded explicitly into every caller-scoped operation; there is no
/// ambient per-request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// The caller's user id.
    pub id: UserId,
    /// The caller's email, used for payer identity and notifications.
    pub email: String,
}

impl Caller {
    /// Create a caller identity.
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// Result of a successful rental creation: the pending rental plus the
/// payable invoice reference the client pays out-of-band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRental {
    /// The pending rental.
    pub rental: Rental,
    /// The pending payment record, including the checkout URL.
    pub payment: PaymentRecord,
}

/// Main operations implementation.
///
/// Each inbound request is handled by one call on this type; the store's
/// transaction scope is the only synchronization between concurrent
/// workers.
pub struct RentalService {
    /// Service state containing all storage components.
    pub state: Store,
    /// Payment gateway capability.
    gateway: Arc<dyn InvoiceGateway>,
    /// Outbound notification queue.
    notifications: NotificationDispatcher,
    /// Operations configuration.
    config: OpsConfig,
}

impl RentalService {
    /// Create a service over the given store, gateway, and notifier.
    ///
    /// Spawns the notification worker; must be called from within a
    /// tokio runtime.
    pub fn new(
        state: Store,
        gateway: Arc<dyn InvoiceGateway>,
        notifier: Arc<dyn Notifier>,
        config: OpsConfig,
    ) -> Self {
        let audit = SqliteNotificationStore::new(state.connection());
        let notifications =
            NotificationDispatcher::spawn(notifier, audit, config.notify_queue_depth);

        Self {
            state,
            gateway,
            notifications,
            config,
        }
    }

    /// Get the operations configuration.
    pub fn config(&self) -> &OpsConfig {
        &self.config
    }

    pub(crate) fn gateway(&self) -> &Arc<dyn InvoiceGateway> {
        &self.gateway
    }

    pub(crate) fn notifications(&self) -> &NotificationDispatcher {
        &self.notifications
    }
}
