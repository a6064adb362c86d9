//! Driving port for idempotent email submission.
//!
//! Inbound adapters validate the request shape and hand the result to a
//! [`SendEmailCommand`]. The command owns fingerprinting, in-flight
//! detection, store lookups and the single downstream dispatch.

use async_trait::async_trait;

use crate::domain::{
    Error, IdempotencyKey, OutboundEmail, RecordStatus, SendEmailResponse,
};

/// Validated submission handed to the command.
#[derive(Debug, Clone)]
pub struct SendEmailRequest {
    /// Client idempotency key.
    pub idempotency_key: IdempotencyKey,
    /// Raw request body, used by keyed fingerprints.
    pub body: Vec<u8>,
    /// Email to deliver.
    pub email: OutboundEmail,
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendEmailOutcome {
    /// The email is delivered. `replayed` is true when no dispatch happened
    /// because a completed record already existed.
    Completed {
        /// Response body to return.
        response: SendEmailResponse,
        /// Whether the response was served from the store.
        replayed: bool,
    },
    /// Another request with the same fingerprint is being handled by this
    /// instance; the client should retry later.
    InProgress {
        /// Response body carrying `status: pending`.
        response: SendEmailResponse,
    },
}

impl SendEmailOutcome {
    /// Response body regardless of variant.
    pub fn response(&self) -> &SendEmailResponse {
        match self {
            Self::Completed { response, .. } | Self::InProgress { response } => response,
        }
    }
}

/// Driving port for idempotent email submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SendEmailCommand: Send + Sync {
    /// Fail fast when a required runtime dependency is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::Misconfigured`](crate::domain::ErrorCode) naming
    /// the missing dependency.
    fn ensure_ready(&self) -> Result<(), Error>;

    /// Submit an email at most once per fingerprint.
    async fn send(&self, request: SendEmailRequest) -> Result<SendEmailOutcome, Error>;
}

/// Fixture command that reports every submission as freshly completed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSendEmailCommand;

#[async_trait]
impl SendEmailCommand for FixtureSendEmailCommand {
    fn ensure_ready(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn send(&self, request: SendEmailRequest) -> Result<SendEmailOutcome, Error> {
        Ok(SendEmailOutcome::Completed {
            response: SendEmailResponse {
                id: request.idempotency_key.to_string(),
                status: RecordStatus::Completed,
                to: request.email.to,
                subject: request.email.subject,
            },
            replayed: false,
        })
    }
}
