//! HTTP inbound adapter.

pub mod cors;
pub mod emails;
pub mod error;
pub mod health;
pub mod idempotency;
pub mod state;
pub mod validation;

pub use error::ApiResult;
