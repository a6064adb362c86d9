//! Persisted idempotency records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::SendEmailResponse;

/// Lifecycle status of a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Accepted but the downstream delivery is not confirmed.
    Pending,
    /// Downstream delivery confirmed; terminal until the record expires.
    Completed,
}

impl RecordStatus {
    /// Wire and storage spelling of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value stored against a [`RequestFingerprint`](super::RequestFingerprint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    /// Current status of the fingerprint.
    pub status: RecordStatus,
    /// Response to replay verbatim on retries, when one was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<SendEmailResponse>,
}

/// Stored value could not be decoded into an [`IdempotencyRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised idempotency record: {message}")]
pub struct RecordDecodeError {
    /// Decoder diagnostic.
    pub message: String,
}

impl IdempotencyRecord {
    /// Record for a confirmed delivery carrying the response to replay.
    pub fn completed(response: SendEmailResponse) -> Self {
        Self {
            status: RecordStatus::Completed,
            response: Some(response),
        }
    }

    /// Whether the fingerprint reached its terminal state.
    pub fn is_completed(&self) -> bool {
        self.status == RecordStatus::Completed
    }

    /// Encode the record for storage.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; this only happens for non-UTF-8 data,
    /// which the record types cannot hold.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored value.
    ///
    /// Accepts the JSON record form and the bare `pending` / `completed`
    /// strings written by deployments that stored only the status.
    ///
    /// # Errors
    ///
    /// Returns [`RecordDecodeError`] when the value matches neither form.
    ///
    /// # Example
    ///
    /// ```
    /// # use mail_gateway::domain::{IdempotencyRecord, RecordStatus};
    /// let legacy = IdempotencyRecord::decode("completed").expect("legacy form");
    /// assert_eq!(legacy.status, RecordStatus::Completed);
    /// assert!(legacy.response.is_none());
    /// ```
    pub fn decode(raw: &str) -> Result<Self, RecordDecodeError> {
        match raw.trim() {
            "pending" => Ok(Self {
                status: RecordStatus::Pending,
                response: None,
            }),
            "completed" => Ok(Self {
                status: RecordStatus::Completed,
                response: None,
            }),
            other => serde_json::from_str(other).map_err(|err| RecordDecodeError {
                message: err.to_string(),
            }),
        }
    }
}
