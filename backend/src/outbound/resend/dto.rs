//! Wire types for the Resend `POST /emails` call.

use serde::{Deserialize, Serialize};

use crate::domain::OutboundEmail;

#[derive(Debug, Serialize)]
pub(super) struct SendEmailBodyDto<'a> {
    pub(super) from: &'a str,
    pub(super) to: &'a str,
    pub(super) subject: &'a str,
    pub(super) html: &'a str,
}

impl<'a> From<&'a OutboundEmail> for SendEmailBodyDto<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        Self {
            from: &email.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SendEmailReplyDto {
    #[serde(default)]
    pub(super) id: Option<String>,
}
