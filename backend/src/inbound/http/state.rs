//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` so they depend only on the
//! driving port and stay testable without I/O.

use std::sync::Arc;

use crate::domain::DEFAULT_SENDER;
use crate::domain::ports::SendEmailCommand;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Idempotent email submission use-case.
    pub send_email: Arc<dyn SendEmailCommand>,
    /// Sender applied when a request omits `from`.
    pub default_sender: Arc<str>,
}

impl HttpState {
    /// Construct state with the stock default sender.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mail_gateway::domain::ports::FixtureSendEmailCommand;
    /// use mail_gateway::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureSendEmailCommand));
    /// assert_eq!(&*state.default_sender, "Info <info@b3pay.net>");
    /// ```
    pub fn new(send_email: Arc<dyn SendEmailCommand>) -> Self {
        Self {
            send_email,
            default_sender: Arc::from(DEFAULT_SENDER),
        }
    }

    /// Override the default sender.
    #[must_use]
    pub fn with_default_sender(mut self, sender: impl Into<Arc<str>>) -> Self {
        self.default_sender = sender.into();
        self
    }
}
