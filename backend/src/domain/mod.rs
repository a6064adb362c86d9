//! Domain primitives, ports and services.
//!
//! Purpose: define the idempotency model and the send-email state machine
//! independently of HTTP, Redis or the email provider. Adapters live in
//! `inbound` and `outbound` and reach the domain only through [`ports`].
//!
//! Public surface:
//! - [`IdempotencyKey`], [`KeyDeriver`], [`RequestFingerprint`]: fingerprinting.
//! - [`IdempotencyRecord`], [`RecordStatus`]: persisted state.
//! - [`InFlightSet`]: per-process concurrency guard.
//! - [`SendEmailService`]: the driving port implementation.
//! - [`Error`], [`ErrorCode`]: transport-agnostic failures.

mod credential;
mod email;
pub mod error;
mod idempotency;
mod in_flight;
pub mod ports;
mod send_email;
mod trace_id;

pub use self::credential::ProviderCredential;
pub use self::email::{
    DEFAULT_SENDER, EmailRequest, EmailValidationError, OutboundEmail, SendEmailResponse,
};
pub use self::error::{Error, ErrorCode};
pub use self::idempotency::{
    DEFAULT_FINGERPRINT_NAMESPACE, FingerprintPolicy, IdempotencyConfig, IdempotencyKey,
    IdempotencyKeyValidationError, IdempotencyRecord, KeyDeriver, ParseFingerprintPolicyError,
    RecordDecodeError, RecordStatus, RequestFingerprint,
};
pub use self::in_flight::{InFlightGuard, InFlightSet};
pub use self::send_email::{GatewayConfig, SendEmailService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
