//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod email_dispatcher;
mod idempotency_metrics;
mod idempotency_store;
mod send_email;

#[cfg(test)]
pub use email_dispatcher::MockEmailDispatcher;
pub use email_dispatcher::{DeliveryReceipt, EmailDispatchError, EmailDispatcher};
#[cfg(test)]
pub use idempotency_metrics::MockIdempotencyMetrics;
pub use idempotency_metrics::{
    IdempotencyMetricLabels, IdempotencyMetrics, IdempotencyMetricsError, NoOpIdempotencyMetrics,
};
#[cfg(test)]
pub use idempotency_store::MockIdempotencyStore;
pub use idempotency_store::{IdempotencyStore, IdempotencyStoreError};
#[cfg(test)]
pub use send_email::MockSendEmailCommand;
pub use send_email::{
    FixtureSendEmailCommand, SendEmailCommand, SendEmailOutcome, SendEmailRequest,
};
