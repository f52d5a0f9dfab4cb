//! Status enumerations for rentals, payments, and notifications.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a rental.
///
/// Transitions:
/// - `Pending → Active` (payment confirmed, inventory decremented)
/// - `Pending → Cancelled` (user cancel, payment failure, or stock race)
/// - `Active → Completed` (vehicle returned, inventory restored)
///
/// `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    /// Created, awaiting payment confirmation. Inventory not yet taken.
    #[default]
    Pending = 0x00,
    /// Paid and running. Exactly one inventory unit is held.
    Active = 0x01,
    /// Returned. Inventory restored.
    Completed = 0x02,
    /// Terminated without an active rental. Inventory restored if held.
    Cancelled = 0x03,
}

impl RentalStatus {
    /// Decode from the stored integer value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Pending),
            0x01 => Some(Self::Active),
            0x02 => Some(Self::Completed),
            0x03 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true for states no further transition may leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Stable lowercase name for display and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a payment record as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Invoice issued, not yet settled.
    #[default]
    Pending = 0x00,
    /// Gateway confirmed the money was collected.
    Paid = 0x01,
    /// Invoice expired unpaid.
    Expired = 0x02,
    /// Gateway reported the payment failed.
    Failed = 0x03,
}

impl PaymentStatus {
    /// Decode from the stored integer value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Pending),
            0x01 => Some(Self::Paid),
            0x02 => Some(Self::Expired),
            0x03 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Parse the status string carried by gateway notifications.
    ///
    /// The gateway reports uppercase names (`PAID`, `EXPIRED`, ...); invoice
    /// creation responses use the same vocabulary. Unknown strings return
    /// `None` so callers can reject rather than guess.
    pub fn from_gateway(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PAID" | "SETTLED" => Some(Self::Paid),
            "EXPIRED" => Some(Self::Expired),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Stable lowercase name for display and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Expired => "expired",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an outbound notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Payment confirmed, rental activated.
    PaymentConfirmed = 0x00,
    /// Vehicle returned, rental completed.
    ReturnConfirmed = 0x01,
    /// Rental cancelled (payment failure or stock race).
    RentalCancelled = 0x02,
}

impl NotificationKind {
    /// Decode from the stored integer value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::PaymentConfirmed),
            0x01 => Some(Self::ReturnConfirmed),
            0x02 => Some(Self::RentalCancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentConfirmed => "payment_confirmed",
            Self::ReturnConfirmed => "return_confirmed",
            Self::RentalCancelled => "rental_cancelled",
        }
    }
}

/// Outcome of a notification dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Handed to the delivery channel.
    Sent = 0x00,
    /// Delivery failed; logged only, never escalated.
    Failed = 0x01,
}

impl DeliveryStatus {
    /// Decode from the stored integer value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Sent),
            0x01 => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}
