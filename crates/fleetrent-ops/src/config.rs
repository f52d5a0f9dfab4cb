//! Configuration types for the operations layer.

use fleetrent_types::constants::MAX_RENTAL_DAYS;

/// Default depth of the outbound notification queue.
const DEFAULT_NOTIFY_QUEUE_DEPTH: usize = 64;

/// Configuration for operations behavior.
///
/// The webhook secret has no default: reconciliation refuses to run
/// without one, so construction requires it.
#[derive(Debug, Clone)]
pub struct OpsConfig {
    /// Shared secret the gateway sends with every webhook notification.
    pub webhook_secret: String,
    /// Depth of the bounded outbound-notification queue. When full,
    /// notifications are dropped with a warning.
    pub notify_queue_depth: usize,
    /// Maximum rental length in days.
    pub max_rental_days: i64,
}

impl OpsConfig {
    /// Create a configuration with the given webhook secret.
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            notify_queue_depth: DEFAULT_NOTIFY_QUEUE_DEPTH,
            max_rental_days: MAX_RENTAL_DAYS,
        }
    }

    /// Set the notification queue depth.
    pub fn with_notify_queue_depth(mut self, depth: usize) -> Self {
        self.notify_queue_depth = depth;
        self
    }

    /// Set the maximum rental length in days.
    pub fn with_max_rental_days(mut self, days: i64) -> Self {
        self.max_rental_days = days;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OpsConfig::new("whsec-test");
        assert_eq!(config.webhook_secret, "whsec-test");
        assert_eq!(config.notify_queue_depth, DEFAULT_NOTIFY_QUEUE_DEPTH);
        assert_eq!(config.max_rental_days, MAX_RENTAL_DAYS);
    }

    #[test]
    fn test_config_builder() {
        let config = OpsConfig::new("whsec-test")
            .with_notify_queue_depth(8)
            .with_max_rental_days(30);
        assert_eq!(config.notify_queue_depth, 8);
        assert_eq!(config.max_rental_days, 30);
    }
}
