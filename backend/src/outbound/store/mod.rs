//! Idempotency store adapters.
//!
//! - [`InMemoryIdempotencyStore`]: single-instance deployments and tests.
//! - [`RedisIdempotencyStore`]: shared store for multi-instance deployments.

mod memory;
mod redis;

pub use memory::InMemoryIdempotencyStore;
pub use redis::{RedisIdempotencyStore, RedisPool};
