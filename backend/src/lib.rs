//! Idempotent transactional email gateway.
//!
//! Accepts `POST /` with an `Idempotency-Key` header and forwards the email
//! to Resend at most once per key, replaying the stored response to retries.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
