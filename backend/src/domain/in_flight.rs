//! In-process concurrency guard for fingerprints being dispatched.
//!
//! The set is owned by one process instance and shared with request handlers
//! through an `Arc`. It is never persisted and does not coordinate across
//! instances; the idempotency store does that.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::RequestFingerprint;

/// Fingerprints currently being handled by this process.
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// # use mail_gateway::domain::{IdempotencyKey, InFlightSet, KeyDeriver};
/// let set = Arc::new(InFlightSet::new());
/// let key = IdempotencyKey::new("abc123").expect("key");
/// let fingerprint = KeyDeriver::default().derive(&key, b"");
///
/// let guard = set.acquire(&fingerprint).expect("first acquire is granted");
/// assert!(set.acquire(&fingerprint).is_none());
/// drop(guard);
/// assert!(set.acquire(&fingerprint).is_some());
/// ```
#[derive(Debug, Default)]
pub struct InFlightSet {
    held: Mutex<HashSet<RequestFingerprint>>,
}

impl InFlightSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim a fingerprint.
    ///
    /// Returns a guard when granted and `None` when another handler already
    /// holds it. The check and insert happen under one lock acquisition.
    pub fn acquire(self: &Arc<Self>, fingerprint: &RequestFingerprint) -> Option<InFlightGuard> {
        let granted = self.lock().insert(fingerprint.clone());
        granted.then(|| InFlightGuard {
            set: Arc::clone(self),
            fingerprint: fingerprint.clone(),
        })
    }

    /// Release a fingerprint. Releasing an unheld fingerprint is a no-op.
    pub fn release(&self, fingerprint: &RequestFingerprint) {
        self.lock().remove(fingerprint);
    }

    /// Whether the fingerprint is currently held.
    pub fn contains(&self, fingerprint: &RequestFingerprint) -> bool {
        self.lock().contains(fingerprint)
    }

    /// Number of fingerprints currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no fingerprint is held.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the set half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<RequestFingerprint>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped claim on a fingerprint; releases it when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard releases the fingerprint immediately"]
pub struct InFlightGuard {
    set: Arc<InFlightSet>,
    fingerprint: RequestFingerprint,
}

impl InFlightGuard {
    /// Fingerprint held by this guard.
    pub fn fingerprint(&self) -> &RequestFingerprint {
        &self.fingerprint
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.release(&self.fingerprint);
    }
}
