//! Transient state stores for formrelay
//!
//! A transient store holds at most one serialized record per browser
//! session, long enough for a redirect to be followed. Records expire, and
//! reading one consumes it.
//!
//! ## Backends
//!
//! - [`MemoryTransientStore`]: process-local map with TTL and a
//!   [`StoreCleanupTask`] sweeper
//! - `RedisTransientStore`: shared store for multi-process deployments
//!   (feature `redis-backend`)

pub mod cleanup;
pub mod error;
pub mod memory;
#[cfg(feature = "redis-backend")]
pub mod redis_store;
pub mod store;
pub mod token;

pub use cleanup::StoreCleanupTask;
pub use error::StoreError;
pub use memory::MemoryTransientStore;
#[cfg(feature = "redis-backend")]
pub use redis_store::RedisTransientStore;
pub use store::TransientStore;
pub use token::{MAX_TOKEN_LEN, SessionToken};
