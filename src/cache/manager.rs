//! Cache manager with per-entry TTLs and session-boundary invalidation
//!
//! Values are wrapped in a `CacheEntry` carrying the write timestamp and a
//! time-to-live supplied at write time. An entry is valid while
//! `now - stored_at <= ttl`; expiry is enforced lazily at read time and
//! expired rows are simply skipped, never deleted. The only physical removal
//! is the prefix sweep that runs once per process at startup.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::store::KeyValueStore;

/// Prefix shared by every cached fixture entry. Callers other than the
/// orchestrator may share entries by using the same URL-derived key.
pub const CACHE_PREFIX: &str = "cache:";

/// Store key holding the identifier of the session that last wrote the cache.
const SESSION_KEY: &str = "session:id";

/// Builds the cache key for a fixtures endpoint URL.
pub fn cache_key(url: &str) -> String {
    format!("{}{}", CACHE_PREFIX, url)
}

/// Wrapper persisted for every cached value.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// When the value was written
    stored_at: DateTime<Utc>,
    /// Validity duration in milliseconds, supplied at write time
    ttl_ms: u64,
    /// The cached payload
    value: T,
}

/// TTL cache over an opaque persistent string store.
///
/// Construction performs the session-boundary check: a fresh session
/// identifier is compared against the one persisted by the previous run,
/// and on mismatch every `cache:`-prefixed key is removed before any read
/// is attempted. Store faults never propagate; reads degrade to misses and
/// writes to no-ops.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
    session_id: String,
}

impl CacheManager {
    /// Creates a cache manager over `store` and runs the session sweep.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let session_id = format!("{:016x}", rand::random::<u64>());
        let manager = Self { store, session_id };
        manager.start_session();
        manager
    }

    /// Discards cache entries left behind by a previous session.
    ///
    /// The persisted identifier can only match when this process wrote it,
    /// so entries from a predecessor session are always removed here,
    /// independently of their per-entry TTLs.
    fn start_session(&self) {
        let previous = match self.store.get(SESSION_KEY) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Failed to read session id; sweeping cache");
                None
            }
        };

        if previous.as_deref() != Some(self.session_id.as_str()) {
            self.invalidate_all(CACHE_PREFIX);
        }

        if let Err(e) = self.store.set(SESSION_KEY, &self.session_id) {
            debug!(error = %e, "Failed to persist session id");
        }
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if the entry is absent, expired, malformed, or the
    /// store itself fails. All of those are the same "miss" to callers.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(key, error = %e, "Store read failed; treating as miss");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "Malformed cache entry; treating as miss");
                return None;
            }
        };

        if entry_is_fresh(entry.stored_at, entry.ttl_ms, Utc::now()) {
            Some(entry.value)
        } else {
            debug!(key, "Cache entry expired");
            None
        }
    }

    /// Writes `value` under `key` with the given time-to-live.
    ///
    /// A write fully replaces any prior entry under the same key. Store or
    /// serialization failures turn the write into a no-op.
    pub fn write<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let entry = CacheEntry {
            stored_at: Utc::now(),
            ttl_ms: ttl.as_millis().min(u64::MAX as u128) as u64,
            value,
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                debug!(key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(key, &json) {
            debug!(key, error = %e, "Store write failed; value not cached");
        }
    }

    /// Removes every persisted key beginning with `prefix`.
    pub fn invalidate_all(&self, prefix: &str) {
        let keys = match self.store.list_keys() {
            Ok(keys) => keys,
            Err(e) => {
                debug!(error = %e, "Failed to list store keys; sweep skipped");
                return;
            }
        };

        for key in keys.iter().filter(|k| k.starts_with(prefix)) {
            if let Err(e) = self.store.remove(key) {
                debug!(key = %key, error = %e, "Failed to remove cache entry");
            }
        }
    }
}

/// An entry is valid while its age has not exceeded its TTL. An age exactly
/// equal to the TTL is still valid; one millisecond past it is not. A
/// negative age (clock skew) reads as valid.
fn entry_is_fresh(stored_at: DateTime<Utc>, ttl_ms: u64, now: DateTime<Utc>) -> bool {
    let age_ms = now.signed_duration_since(stored_at).num_milliseconds();
    age_ms <= i64::try_from(ttl_ms).unwrap_or(i64::MAX)
}
