//! Port abstraction for idempotency record persistence.
//!
//! The store is the only state shared between gateway instances. It offers
//! plain `get` and `put` with a TTL; there is no compare-and-set, so the
//! service never relies on one.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{IdempotencyRecord, RequestFingerprint};

use super::define_port_error;

define_port_error! {
    /// Errors raised by idempotency store adapters.
    pub enum IdempotencyStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "idempotency store connection failed: {message}",
        /// Read or write failed during execution.
        Query { message: String } => "idempotency store query failed: {message}",
        /// Stored value could not be encoded or decoded.
        Serialization { message: String } => "idempotency store serialization failed: {message}",
    }
}

/// Key-value persistence for [`IdempotencyRecord`] values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Fetch the record for a fingerprint.
    ///
    /// Returns `Ok(None)` when the fingerprint is unseen or its record has
    /// expired. Infrastructure failures must be returned as errors, never as
    /// `None`.
    async fn get(
        &self,
        fingerprint: &RequestFingerprint,
    ) -> Result<Option<IdempotencyRecord>, IdempotencyStoreError>;

    /// Write a record that expires after `ttl`, replacing any previous one.
    async fn put(
        &self,
        fingerprint: &RequestFingerprint,
        record: &IdempotencyRecord,
        ttl: Duration,
    ) -> Result<(), IdempotencyStoreError>;
}
