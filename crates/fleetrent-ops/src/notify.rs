//! Outbound notification dispatch.
//!
//! Notifications are best-effort side channels: they are queued after the
//! owning transaction commits and their failure is logged and recorded,
//! never escalated. The queue is bounded; when it is full the notification
//! is dropped with a warning rather than blocking a request worker.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use fleetrent_store::{NotificationStore, SqliteNotificationStore};
use fleetrent_types::{DeliveryStatus, NotificationKind, UserId};

/// Delivery failure reported by a notifier.
#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Capability interface for delivering a notification to a user.
///
/// The delivery transport (SMTP, SMS, ...) lives behind this trait;
/// the service never talks to it directly.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message. Errors are recorded, never retried here.
    async fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier that only logs deliveries.
///
/// Stands in for a real transport where none is configured; the audit
/// row still records the dispatch.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        debug!(to = %to, subject = %subject, "Notification (log only)");
        Ok(())
    }
}

/// Mock notifier for testing.
///
/// Records every delivery and can be switched to fail.
pub struct MockNotifier {
    delivered: Mutex<Vec<(String, String, String)>>,
    fail: Mutex<bool>,
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
        }
    }

    /// Make subsequent deliveries fail.
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock().unwrap() = failing;
    }

    /// Number of successful deliveries.
    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    /// All successful deliveries as (to, subject, body).
    pub fn delivered(&self) -> Vec<(String, String, String)> {
        self.delivered.lock().unwrap().clone()
    }

    /// Poll until at least `count` deliveries happened or the timeout
    /// elapses. Test helper for the asynchronous dispatch path.
    pub async fn wait_for(&self, count: usize) -> bool {
        for _ in 0..100 {
            if self.delivered_count() >= count {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.delivered_count() >= count
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if *self.fail.lock().unwrap() {
            return Err(NotifyError("mock delivery failure".to_string()));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// One queued outbound notification.
#[derive(Debug, Clone)]
pub struct OutboundNotification {
    /// Recipient user, for the audit row.
    pub user: UserId,
    /// Delivery address.
    pub email: String,
    /// What the notification is about.
    pub kind: NotificationKind,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub body: String,
}

/// Bounded-queue dispatcher feeding a single worker task.
///
/// Decouples delivery from the request path and from any transaction:
/// the caller enqueues after commit and moves on.
pub struct NotificationDispatcher {
    tx: mpsc::Sender<OutboundNotification>,
}

impl NotificationDispatcher {
    /// Spawn the worker task and return the dispatch handle.
    ///
    /// The worker delivers each notification through the notifier and
    /// writes an audit row with the outcome. Must be called from within
    /// a tokio runtime.
    pub fn spawn(
        notifier: std::sync::Arc<dyn Notifier>,
        mut audit: SqliteNotificationStore,
        queue_depth: usize,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<OutboundNotification>(queue_depth.max(1));

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                let delivery = match notifier
                    .deliver(
                        &notification.email,
                        &notification.subject,
                        &notification.body,
                    )
                    .await
                {
                    Ok(()) => DeliveryStatus::Sent,
                    Err(e) => {
                        warn!(
                            user_id = %notification.user,
                            kind = notification.kind.as_str(),
                            error = %e,
                            "Notification delivery failed"
                        );
                        DeliveryStatus::Failed
                    }
                };

                if let Err(e) = audit.record(
                    notification.user,
                    notification.kind,
                    delivery,
                    &notification.body,
                ) {
                    warn!(error = %e, "Failed to record notification audit row");
                }
            }
        });

        Self { tx }
    }

    /// Enqueue a notification, dropping it if the queue is full.
    pub fn dispatch(&self, notification: OutboundNotification) {
        if let Err(e) = self.tx.try_send(notification) {
            warn!(error = %e, "Notification queue full, dropping notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetrent_store::Store;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_dispatch_delivers_and_records() {
        let store = Store::open_in_memory().unwrap();
        let audit = SqliteNotificationStore::new(store.connection());
        let notifier = Arc::new(MockNotifier::new());

        let dispatcher = NotificationDispatcher::spawn(notifier.clone(), audit, 8);
        dispatcher.dispatch(OutboundNotification {
            user: UserId(1),
            email: "user@example.com".to_string(),
            kind: NotificationKind::PaymentConfirmed,
            subject: "Payment Successful".to_string(),
            body: "Your payment has been confirmed.".to_string(),
        });

        assert!(notifier.wait_for(1).await);
        let (to, subject, _) = notifier.delivered().remove(0);
        assert_eq!(to, "user@example.com");
        assert_eq!(subject, "Payment Successful");

        // Audit row lands shortly after delivery.
        for _ in 0..100 {
            if !store.notifications.list_for_user(UserId(1)).unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let rows = store.notifications.list_for_user(UserId(1)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].delivery, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn test_failed_delivery_recorded_not_escalated() {
        let store = Store::open_in_memory().unwrap();
        let audit = SqliteNotificationStore::new(store.connection());
        let notifier = Arc::new(MockNotifier::new());
        notifier.set_failing(true);

        let dispatcher = NotificationDispatcher::spawn(notifier.clone(), audit, 8);
        dispatcher.dispatch(OutboundNotification {
            user: UserId(1),
            email: "user@example.com".to_string(),
            kind: NotificationKind::ReturnConfirmed,
            subject: "Car Return Confirmation".to_string(),
            body: "You have successfully returned the vehicle.".to_string(),
        });

        for _ in 0..100 {
            if !store.notifications.list_for_user(UserId(1)).unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let rows = store.notifications.list_for_user(UserId(1)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].delivery, DeliveryStatus::Failed);
        assert_eq!(notifier.delivered_count(), 0);
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let result = LogNotifier
            .deliver("user@example.com", "Subject", "Body")
            .await;
        assert!(result.is_ok());
    }
}
