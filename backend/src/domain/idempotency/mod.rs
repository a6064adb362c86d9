//! Idempotency primitives for safe request retries.
//!
//! - [`IdempotencyKey`]: opaque client token from the `Idempotency-Key`
//!   header.
//! - [`KeyDeriver`]: turns a key (and optionally the body) into a
//!   [`RequestFingerprint`], the store's primary key.
//! - [`IdempotencyRecord`]: persisted status plus the response to replay.
//! - [`IdempotencyConfig`]: retention window for completed records.

mod config;
mod fingerprint;
mod key;
mod record;

pub use config::IdempotencyConfig;
pub use fingerprint::{
    DEFAULT_FINGERPRINT_NAMESPACE, FingerprintPolicy, KeyDeriver, ParseFingerprintPolicyError,
    RequestFingerprint,
};
pub use key::{IdempotencyKey, IdempotencyKeyValidationError};
pub use record::{IdempotencyRecord, RecordDecodeError, RecordStatus};
