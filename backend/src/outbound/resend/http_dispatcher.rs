//! Reqwest-backed Resend dispatcher.
//!
//! Owns transport details only: request serialisation, bearer auth, timeout
//! and status mapping. One call per invocation, no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::warn;

use super::dto::{SendEmailBodyDto, SendEmailReplyDto};
use crate::domain::ports::{DeliveryReceipt, EmailDispatchError, EmailDispatcher};
use crate::domain::{OutboundEmail, ProviderCredential};

/// Production Resend endpoint.
pub const DEFAULT_RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Dispatcher posting emails to a single Resend-compatible endpoint.
pub struct ResendHttpDispatcher {
    client: Client,
    endpoint: Url,
}

impl ResendHttpDispatcher {
    /// Build a dispatcher with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl EmailDispatcher for ResendHttpDispatcher {
    async fn deliver(
        &self,
        credential: &ProviderCredential,
        email: &OutboundEmail,
    ) -> Result<DeliveryReceipt, EmailDispatchError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(credential.expose())
            .json(&SendEmailBodyDto::from(email))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        // The email is accepted at this point; an odd reply must not turn
        // into a failure that invites a resend.
        Ok(parse_receipt(body.as_ref()).unwrap_or_else(|error| {
            warn!(%error, "provider accepted email with an undecodable reply");
            DeliveryReceipt::default()
        }))
    }
}

fn parse_receipt(body: &[u8]) -> Result<DeliveryReceipt, EmailDispatchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DeliveryReceipt::default());
    }
    let reply: SendEmailReplyDto = serde_json::from_slice(body)
        .map_err(|error| EmailDispatchError::decode(format!("invalid reply JSON: {error}")))?;
    Ok(DeliveryReceipt {
        provider_id: reply.id,
    })
}

fn map_transport_error(error: reqwest::Error) -> EmailDispatchError {
    if error.is_timeout() {
        EmailDispatchError::timeout(error.to_string())
    } else {
        EmailDispatchError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EmailDispatchError {
    EmailDispatchError::rejected(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 200;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
        format!("{preview}...")
    } else {
        compact
    }
}
