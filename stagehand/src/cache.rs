//! Process-wide TTL cache.
//!
//! A small key→value store used to avoid repeat fetches of slow-changing
//! data: the per-session static payload, the global coaching config, and
//! the registry's resolved-value cache all live in instances of this type.
//!
//! The cache holds heterogeneous values behind `Arc<dyn Any>` with typed
//! reads; callers share the stored `Arc` and must not rely on deep copies.
//! Expiry is lazy — an expired entry is dropped by the next read that
//! touches its key — and there is no eviction beyond TTL because key
//! cardinality stays small (one entry per active session plus a handful
//! of global keys). A cold cache is indistinguishable from "nothing
//! cached": every caller tolerates a miss by re-fetching.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use smol_str::SmolStr;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

/// Default entry TTL when none is given: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
struct CachedEntry {
    value: Arc<dyn Any + Send + Sync>,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

impl CachedEntry {
    /// An entry is visible only while `now - stored_at <= ttl`.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.stored_at)
            .to_std()
            .is_ok_and(|age| age > self.ttl)
    }
}

/// TTL-based in-process cache. Never errors; sharded for concurrent use.
pub struct SessionCache {
    entries: DashMap<SmolStr, CachedEntry>,
    default_ttl: Duration,
}

impl SessionCache {
    /// A cache with the [`DEFAULT_TTL`] for untimed writes.
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// A cache with a custom default TTL for untimed writes.
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        SessionCache {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Stores `value` under `key`, overwriting any existing entry.
    pub fn set<T>(&self, key: impl Into<SmolStr>, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        self.entries.insert(
            key.into(),
            CachedEntry {
                value: Arc::new(value),
                stored_at: Utc::now(),
                ttl,
            },
        );
    }

    /// Stores `value` under `key` with the cache's default TTL.
    pub fn set_default<T>(&self, key: impl Into<SmolStr>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.set(key, value, self.default_ttl);
    }

    /// Returns the live value stored under `key`, dropping it first if it
    /// has expired. Returns `None` on a type mismatch as well — a caller
    /// asking for the wrong type is equivalent to a miss.
    pub fn get<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let now = Utc::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        let entry = self.entries.get(key)?;
        Arc::clone(&entry.value).downcast::<T>().ok()
    }

    /// Whether a live entry exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        let now = Utc::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        self.entries.contains_key(key)
    }

    /// Removes the entry under `key`, if any.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries currently stored, expired ones included until
    /// their next read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("entries", &self.entries.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
