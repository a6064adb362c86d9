//! Resend email provider adapter.
//!
//! Thin HTTP implementation of the `EmailDispatcher` port.

mod dto;
mod http_dispatcher;

pub use http_dispatcher::{DEFAULT_RESEND_ENDPOINT, ResendHttpDispatcher};
