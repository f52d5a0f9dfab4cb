//! Payment record and webhook wire types.

use serde::{Deserialize, Serialize};

use crate::constants::EXTERNAL_REF_PREFIX;
use crate::enums::PaymentStatus;
use crate::{Amount, PaymentId, RentalId, Timestamp};

/// Local record correlating a rental with an external gateway invoice.
///
/// One per rental (`rental_id` unique). Created in `Pending` together with
/// its rental; thereafter mutated only by the webhook reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaymentRecord {
    /// Row identity.
    pub id: PaymentId,
    /// The rental this payment settles. 1:1.
    pub rental_id: RentalId,
    /// Invoice id assigned by the gateway.
    pub invoice_id: String,
    /// Deterministic idempotency key shared with the gateway. Unique.
    pub external_reference: String,
    /// Invoice amount, smallest currency unit.
    pub amount: Amount,
    /// Settlement state.
    pub status: PaymentStatus,
    /// Hosted checkout page for the payer.
    pub payment_url: String,
    /// Payer's email, captured at invoice creation. Post-commit
    /// notifications are addressed here since webhook handling has no
    /// caller context.
    pub payer_email: String,
    /// Money was collected but the rental could not be activated; an
    /// operator must issue a refund.
    pub requires_refund: bool,
    /// Creation time, unix seconds.
    pub created_at: Timestamp,
    /// Last mutation time, unix seconds. Monotonic per row.
    pub updated_at: Timestamp,
}

/// Idempotency key sent to the gateway for a rental's invoice.
///
/// Derived from the rental identity alone, so a retried invoice creation
/// for the same rental lands on the same external charge.
pub fn external_reference(rental_id: RentalId) -> String {
    format!("{}{}", EXTERNAL_REF_PREFIX, rental_id)
}

/// Asynchronous payment-status notification from the gateway.
///
/// At-least-once, possibly out of order, possibly replayed, arriving over
/// an untrusted channel. `status` stays a raw string here; the reconciler
/// parses it and rejects unknown values without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WebhookNotification {
    /// Our idempotency key, echoed back by the gateway.
    pub external_id: String,
    /// Reported payment status (gateway vocabulary, e.g. "PAID").
    pub status: String,
    /// Amount the gateway says was involved.
    pub amount: Amount,
    /// Gateway-side notification id.
    pub id: String,
}

impl WebhookNotification {
    /// Parse the reported status into our vocabulary.
    pub fn parsed_status(&self) -> Option<PaymentStatus> {
        PaymentStatus::from_gateway(&self.status)
    }
}
