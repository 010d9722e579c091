//! TTL cache over a persistent key-value store
//!
//! This module provides a cache manager that stores JSON-serialized values
//! tagged with a write timestamp and a per-entry time-to-live. Expired or
//! malformed entries read back as plain misses, and store faults degrade to
//! misses and no-op writes, so the cache is always an optimization and never
//! a source of truth.

mod manager;

pub use manager::{cache_key, CacheManager, CACHE_PREFIX};
