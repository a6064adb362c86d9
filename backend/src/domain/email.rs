//! Transactional email request and response types.

use serde::{Deserialize, Serialize};

use super::RecordStatus;

/// Sender used when a request omits `from`.
pub const DEFAULT_SENDER: &str = "Info <info@b3pay.net>";

/// Client request body for a transactional email.
///
/// Fields are optional at the serde layer so that absent and blank values
/// are reported uniformly by [`EmailRequest::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EmailRequest {
    /// Recipient address.
    #[serde(default)]
    pub to: Option<String>,
    /// Optional sender; falls back to the configured default.
    #[serde(default)]
    pub from: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// HTML body.
    #[serde(default)]
    pub html: Option<String>,
}

/// Required fields absent from an [`EmailRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", .fields.join(", "))]
pub struct EmailValidationError {
    /// Names of the missing or blank fields.
    pub fields: Vec<&'static str>,
}

/// Validated email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

impl EmailRequest {
    /// Check required fields and resolve the sender.
    ///
    /// # Errors
    ///
    /// Returns [`EmailValidationError`] listing every field that is missing
    /// or blank.
    ///
    /// # Example
    ///
    /// ```
    /// # use mail_gateway::domain::{EmailRequest, DEFAULT_SENDER};
    /// let request = EmailRequest {
    ///     to: Some("a@x.com".into()),
    ///     from: None,
    ///     subject: Some("Hi".into()),
    ///     html: Some("<p>hi</p>".into()),
    /// };
    /// let email = request.validate(DEFAULT_SENDER).expect("valid request");
    /// assert_eq!(email.from, DEFAULT_SENDER);
    /// ```
    pub fn validate(self, default_sender: &str) -> Result<OutboundEmail, EmailValidationError> {
        let Self {
            to,
            from,
            subject,
            html,
        } = self;

        let mut missing = Vec::new();
        let to = required(to, "to", &mut missing);
        let subject = required(subject, "subject", &mut missing);
        let html = required(html, "html", &mut missing);

        match (to, subject, html) {
            (Some(to), Some(subject), Some(html)) => Ok(OutboundEmail {
                from: from
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| default_sender.to_owned()),
                to,
                subject,
                html,
            }),
            _ => Err(EmailValidationError { fields: missing }),
        }
    }
}

fn required(
    value: Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            missing.push(name);
            None
        }
    }
}

/// Response body returned to clients and replayed on retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SendEmailResponse {
    /// Request fingerprint identifying the logical send.
    #[schema(example = "abc123")]
    pub id: String,
    /// `completed` once delivered, `pending` while another attempt is in flight.
    pub status: RecordStatus,
    /// Recipient address.
    #[schema(example = "a@x.com")]
    pub to: String,
    /// Subject line.
    #[schema(example = "Hi")]
    pub subject: String,
}
