//! Process-local idempotency store.
//!
//! Suitable for single-instance deployments and tests. Expiry is evaluated
//! lazily against an injected [`Clock`], and expired entries are dropped
//! when read or when a write sweeps the map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{IdempotencyStore, IdempotencyStoreError};
use crate::domain::{IdempotencyRecord, RequestFingerprint};

struct Entry {
    encoded: String,
    expires_at: DateTime<Utc>,
}

/// TTL-aware in-memory [`IdempotencyStore`].
///
/// Records are stored in their encoded form so that reads exercise the same
/// decoding path as external stores.
pub struct InMemoryIdempotencyStore {
    entries: Mutex<HashMap<RequestFingerprint, Entry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryIdempotencyStore {
    /// Create an empty store driven by `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of unexpired records.
    pub fn len(&self) -> usize {
        let now = self.clock.utc();
        self.lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// Whether no unexpired record is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestFingerprint, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn get(
        &self,
        fingerprint: &RequestFingerprint,
    ) -> Result<Option<IdempotencyRecord>, IdempotencyStoreError> {
        let now = self.clock.utc();
        let encoded = {
            let mut entries = self.lock();
            match entries.get(fingerprint) {
                Some(entry) if entry.expires_at > now => entry.encoded.clone(),
                Some(_) => {
                    entries.remove(fingerprint);
                    return Ok(None);
                }
                None => return Ok(None),
            }
        };
        IdempotencyRecord::decode(&encoded)
            .map(Some)
            .map_err(|err| IdempotencyStoreError::serialization(err.to_string()))
    }

    async fn put(
        &self,
        fingerprint: &RequestFingerprint,
        record: &IdempotencyRecord,
        ttl: Duration,
    ) -> Result<(), IdempotencyStoreError> {
        let encoded = record
            .encode()
            .map_err(|err| IdempotencyStoreError::serialization(err.to_string()))?;
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|err| IdempotencyStoreError::query(format!("invalid ttl: {err}")))?;
        let now = self.clock.utc();
        let expires_at = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.lock();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(fingerprint.clone(), Entry { encoded, expires_at });
        Ok(())
    }
}
