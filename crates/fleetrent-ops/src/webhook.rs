//! Webhook reconciliation, the rental/payment consistency core.
//!
//! The gateway delivers payment-status notifications at least once, in
//! any order, over an untrusted channel. This module turns each one into
//! exactly one application of its effect:
//!
//! 1. Token check before any lookup; a bad token never touches state.
//! 2. Lookup by external reference; unknown references are rejected
//!    without side effects.
//! 3. A notification matching the stored status is a successful no-op,
//!    so replays never double-apply.
//! 4. Payment status, rental transition, and the stock decrement commit
//!    in one transaction; any failure rolls back all of it.
//! 5. Only `Pending → Paid` activates a rental. When stock ran out in
//!    the meantime, the rental is cancelled instead and the payment is
//!    flagged for manual refund.
//! 6. Confirmation notifications go out after commit and never roll it
//!    back.

use tracing::{debug, info, warn};

use fleetrent_store::{payments, rentals, vehicles, StoreError};
use fleetrent_types::{
    NotificationKind, PaymentRecord, PaymentStatus, Rental, RentalStatus, WebhookNotification,
};

use crate::error::{OpsError, OpsResult};
use crate::notify::OutboundNotification;
use crate::service::RentalService;

/// Result of applying one webhook notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Payment confirmed; rental activated and one unit taken.
    Activated,
    /// Payment confirmed but stock was exhausted; rental cancelled and
    /// the payment flagged for manual refund.
    CancelledOutOfStock,
    /// Payment lapsed (`Expired`/`Failed`); the still-pending rental was
    /// cancelled. No inventory was ever taken.
    Cancelled,
    /// Payment status recorded; the rental needed no change.
    Recorded,
    /// Exact replay of an already-applied notification. Success, not an
    /// error, so the gateway stops retrying.
    Duplicate,
}

impl ReconcileOutcome {
    /// True when the notification changed nothing.
    pub fn is_noop(&self) -> bool {
        matches!(self, ReconcileOutcome::Duplicate)
    }
}

/// What happened inside the reconciliation transaction.
///
/// Rejections ride through as values (not errors) so the transaction
/// wrapper only rolls back on genuine storage failures.
enum TxVerdict {
    NotFound,
    Duplicate,
    Conflict(String),
    Activated { payment: PaymentRecord, rental: Rental },
    OutOfStockCancelled { payment: PaymentRecord, rental: Rental },
    Cancelled,
    Recorded,
}

impl RentalService {
    /// Apply one payment-status notification.
    ///
    /// Duplicate delivery returns `Ok(Duplicate)`; every rejection
    /// surfaces as an error with no state change.
    pub fn handle_webhook(
        &mut self,
        token: &str,
        notification: &WebhookNotification,
    ) -> OpsResult<ReconcileOutcome> {
        // Authenticity first; nothing is read or written before this.
        let secret = &self.config().webhook_secret;
        if secret.is_empty() || token != secret {
            warn!("Webhook rejected: invalid callback token");
            return Err(OpsError::Unauthorized);
        }

        let incoming = notification.parsed_status().ok_or_else(|| {
            OpsError::validation(format!("unknown payment status '{}'", notification.status))
        })?;

        debug!(
            reference = %notification.external_id,
            status = %incoming,
            notification_id = %notification.id,
            "Webhook notification received"
        );

        let verdict = self.state.with_tx(|tx| {
            let payment = match payments::get_by_reference(tx, &notification.external_id)? {
                Some(payment) => payment,
                None => return Ok(TxVerdict::NotFound),
            };

            if notification.amount != payment.amount {
                warn!(
                    reference = %payment.external_reference,
                    expected = payment.amount,
                    reported = notification.amount,
                    "Webhook amount differs from invoice amount"
                );
            }

            // Replays short-circuit before any write.
            if payment.status == incoming {
                return Ok(TxVerdict::Duplicate);
            }
            if payment.status != PaymentStatus::Pending {
                return Ok(TxVerdict::Conflict(format!(
                    "payment already {}, cannot become {}",
                    payment.status, incoming
                )));
            }

            let rental = rentals::get_rental(tx, payment.rental_id)?
                .ok_or(StoreError::RentalNotFound(payment.rental_id))?;

            match incoming {
                PaymentStatus::Paid => {
                    if rental.status != RentalStatus::Pending {
                        return Ok(TxVerdict::Conflict(format!(
                            "rental already {}, cannot activate",
                            rental.status
                        )));
                    }
                    payments::set_status(tx, payment.id, PaymentStatus::Paid)?;
                    match vehicles::decrement_stock(tx, rental.vehicle_id) {
                        Ok(()) => {
                            rentals::set_status(tx, rental.id, RentalStatus::Active)?;
                            Ok(TxVerdict::Activated { payment, rental })
                        }
                        Err(StoreError::OutOfStock(_)) => {
                            // Stock ran out between reservation and payment.
                            // The money is collected; record that an operator
                            // must refund it instead of dropping it silently.
                            rentals::set_status(tx, rental.id, RentalStatus::Cancelled)?;
                            payments::flag_refund(tx, payment.id)?;
                            Ok(TxVerdict::OutOfStockCancelled { payment, rental })
                        }
                        Err(e) => Err(e),
                    }
                }
                PaymentStatus::Expired | PaymentStatus::Failed => {
                    payments::set_status(tx, payment.id, incoming)?;
                    if rental.status == RentalStatus::Pending {
                        rentals::set_status(tx, rental.id, RentalStatus::Cancelled)?;
                        Ok(TxVerdict::Cancelled)
                    } else {
                        Ok(TxVerdict::Recorded)
                    }
                }
                // A pending payment reporting "pending" was the duplicate
                // branch above; any other value is unmappable.
                _ => Ok(TxVerdict::Conflict(format!(
                    "no transition from {} to {}",
                    payment.status, incoming
                ))),
            }
        })?;

        // The transaction is committed (or was read-only); everything
        // below is best-effort side channel.
        match verdict {
            TxVerdict::NotFound => Err(OpsError::PaymentNotFound(
                notification.external_id.clone(),
            )),
            TxVerdict::Conflict(msg) => Err(OpsError::Conflict(msg)),
            TxVerdict::Duplicate => {
                info!(
                    reference = %notification.external_id,
                    "Duplicate webhook notification, already applied"
                );
                Ok(ReconcileOutcome::Duplicate)
            }
            TxVerdict::Activated { payment, rental } => {
                info!(
                    rental_id = %rental.id,
                    reference = %payment.external_reference,
                    "Payment confirmed, rental activated"
                );
                self.notifications().dispatch(OutboundNotification {
                    user: rental.user_id,
                    email: payment.payer_email.clone(),
                    kind: NotificationKind::PaymentConfirmed,
                    subject: "Payment Successful".to_string(),
                    body: format!(
                        "Your payment of {} for rental #{} has been confirmed. \
                         Thank you for using our service!",
                        payment.amount, rental.id
                    ),
                });
                Ok(ReconcileOutcome::Activated)
            }
            TxVerdict::OutOfStockCancelled { payment, rental } => {
                warn!(
                    rental_id = %rental.id,
                    vehicle_id = %rental.vehicle_id,
                    "Paid rental cancelled: stock exhausted, refund required"
                );
                self.notifications().dispatch(OutboundNotification {
                    user: rental.user_id,
                    email: payment.payer_email.clone(),
                    kind: NotificationKind::RentalCancelled,
                    subject: "Rental Cancelled".to_string(),
                    body: format!(
                        "Rental #{} could not be activated because no vehicles \
                         were available. Your payment will be refunded.",
                        rental.id
                    ),
                });
                Ok(ReconcileOutcome::CancelledOutOfStock)
            }
            TxVerdict::Cancelled => {
                info!(
                    reference = %notification.external_id,
                    status = %incoming,
                    "Payment lapsed, pending rental cancelled"
                );
                Ok(ReconcileOutcome::Cancelled)
            }
            TxVerdict::Recorded => {
                info!(
                    reference = %notification.external_id,
                    status = %incoming,
                    "Payment status recorded, rental unchanged"
                );
                Ok(ReconcileOutcome::Recorded)
            }
        }
    }
}
