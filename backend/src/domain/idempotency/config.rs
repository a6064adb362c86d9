//! Retention settings for idempotency records.

use std::time::Duration;

/// Retention window applied to completed records.
///
/// Records expire at the store level once the TTL elapses, after which the
/// fingerprint is treated as unseen.
///
/// # Example
///
/// ```
/// # use mail_gateway::domain::IdempotencyConfig;
/// # use std::time::Duration;
/// let config = IdempotencyConfig::default();
/// assert_eq!(config.ttl(), Duration::from_secs(86_400));
///
/// let clamped = IdempotencyConfig::from_hours(0);
/// assert_eq!(clamped.ttl(), Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdempotencyConfig {
    ttl: Duration,
}

impl IdempotencyConfig {
    /// Default TTL in hours.
    pub const DEFAULT_TTL_HOURS: u64 = 24;

    /// Minimum allowed TTL in hours.
    ///
    /// Shorter windows would let records expire while clients are still
    /// retrying.
    const MIN_TTL_HOURS: u64 = 1;

    /// Maximum allowed TTL in hours (10 years).
    const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

    /// Build from a configured number of hours, clamped to [1, 87600].
    pub fn from_hours(hours: u64) -> Self {
        let hours = hours.clamp(Self::MIN_TTL_HOURS, Self::MAX_TTL_HOURS);
        Self {
            ttl: Duration::from_secs(hours.saturating_mul(3600)),
        }
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self::from_hours(Self::DEFAULT_TTL_HOURS)
    }
}
