//! Redis-backed idempotency store shared by every gateway instance.
//!
//! Uses plain `GET` and `SET key value EX ttl`. Redis expires records on its
//! own; there is no compare-and-set, matching the port contract.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, RunError};
use bb8_redis::redis::{AsyncCommands, RedisError};

use crate::domain::ports::{IdempotencyStore, IdempotencyStoreError};
use crate::domain::{IdempotencyRecord, RequestFingerprint};

/// Pool of Redis connections.
pub type RedisPool = Pool<RedisConnectionManager>;

/// [`IdempotencyStore`] over a `bb8-redis` pool.
#[derive(Clone)]
pub struct RedisIdempotencyStore {
    pool: RedisPool,
    key_prefix: String,
}

impl RedisIdempotencyStore {
    /// Wrap an existing pool.
    ///
    /// Keys are the bare fingerprint for an empty prefix, otherwise
    /// `{prefix}:{fingerprint}`.
    pub fn new(pool: RedisPool, key_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
        }
    }

    /// Build a lazily connecting pool for `url`.
    ///
    /// Connections are opened on first use, so an unreachable server surfaces
    /// as a store error on the first request rather than at startup.
    ///
    /// # Errors
    ///
    /// Returns [`IdempotencyStoreError::Connection`] when the URL is invalid.
    pub fn connect_lazy(
        url: &str,
        key_prefix: impl Into<String>,
        connection_timeout: Duration,
    ) -> Result<Self, IdempotencyStoreError> {
        let manager = RedisConnectionManager::new(url).map_err(map_redis_error)?;
        let pool = Pool::builder()
            .connection_timeout(connection_timeout)
            .build_unchecked(manager);
        Ok(Self::new(pool, key_prefix))
    }

    fn key_for(&self, fingerprint: &RequestFingerprint) -> String {
        storage_key(&self.key_prefix, fingerprint)
    }
}

fn storage_key(prefix: &str, fingerprint: &RequestFingerprint) -> String {
    if prefix.is_empty() {
        fingerprint.to_string()
    } else {
        format!("{prefix}:{fingerprint}")
    }
}

#[async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn get(
        &self,
        fingerprint: &RequestFingerprint,
    ) -> Result<Option<IdempotencyRecord>, IdempotencyStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Option<String> = conn
            .get(self.key_for(fingerprint))
            .await
            .map_err(map_redis_error)?;
        raw.map(|value| {
            IdempotencyRecord::decode(&value)
                .map_err(|err| IdempotencyStoreError::serialization(err.to_string()))
        })
        .transpose()
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
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.set_ex::<_, _, ()>(self.key_for(fingerprint), encoded, seconds)
            .await
            .map_err(map_redis_error)
    }
}

fn map_pool_error(err: RunError<RedisError>) -> IdempotencyStoreError {
    match err {
        RunError::User(err) => map_redis_error(err),
        RunError::TimedOut => {
            IdempotencyStoreError::connection("timed out waiting for a redis connection")
        }
    }
}

fn map_redis_error(err: RedisError) -> IdempotencyStoreError {
    if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        IdempotencyStoreError::connection(err.to_string())
    } else {
        IdempotencyStoreError::query(err.to_string())
    }
}
