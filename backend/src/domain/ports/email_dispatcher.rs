//! Port for the single downstream side effect: delivering an email.
//!
//! Implementations perform exactly one provider call per invocation and never
//! retry internally. Clients retry by resubmitting with the same key.

use async_trait::async_trait;

use crate::domain::{OutboundEmail, ProviderCredential};

use super::define_port_error;

define_port_error! {
    /// Errors raised by email dispatcher adapters.
    pub enum EmailDispatchError {
        /// Provider answered with a non-success status.
        Rejected { status: u16, message: String } => "Resend API error: {status} - {message}",
        /// Request could not be sent or the connection dropped.
        Transport { message: String } => "email provider transport failed: {message}",
        /// Provider did not answer within the configured timeout.
        Timeout { message: String } => "email provider timed out: {message}",
        /// Provider response body could not be decoded.
        Decode { message: String } => "email provider response could not be decoded: {message}",
    }
}

/// Confirmation returned by the provider for an accepted email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider-assigned message identifier, when supplied.
    pub provider_id: Option<String>,
}

/// Downstream email delivery capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// Deliver one email using the given credential.
    async fn deliver(
        &self,
        credential: &ProviderCredential,
        email: &OutboundEmail,
    ) -> Result<DeliveryReceipt, EmailDispatchError>;
}
