//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **resend**: HTTP delivery through the Resend API
//! - **store**: idempotency records in memory or Redis
//! - **metrics**: Prometheus-backed metrics exporters (feature-gated)
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic.

#[cfg(feature = "metrics")]
pub mod metrics;
pub mod resend;
pub mod store;
