//! Cache store contract and the in-process implementation.
//!
//! A store is a string key-value map with per-entry expiry. Anything that
//! satisfies [`CacheStore`] can back the cache-aside accessor: the in-memory
//! [`MemoryStore`] below or the networked Redis store in `infra::redis`.

use std::{
    sync::{Arc, Mutex, RwLock},
    time::Duration,
};

use async_trait::async_trait;
use lru::LruCache;
use thiserror::Error;
use time::OffsetDateTime;

use super::config::CacheConfig;
use super::lock::{mutex_lock, rw_read, rw_write};

#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache command failed: {0}")]
    Command(String),
    #[error("cache did not answer within {0:?}")]
    TimedOut(Duration),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the live value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError>;
}

/// Time source for entry expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = mutex_lock(&self.now, "manual_clock.advance");
        if let Ok(step) = time::Duration::try_from(by) {
            *now = now.saturating_add(step);
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(OffsetDateTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *mutex_lock(&self.now, "manual_clock.now")
    }
}

#[derive(Clone)]
struct Entry {
    value: String,
    /// `None` when the TTL overflows the calendar; such entries never expire.
    expires_at: Option<OffsetDateTime>,
}

impl Entry {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

/// In-process LRU store with per-entry expiry.
pub struct MemoryStore {
    entries: RwLock<LruCache<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.memory_capacity)),
            clock,
        }
    }

    /// Read the live value for `key`, dropping the entry if it has expired.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = rw_write(&self.entries, "memory_store.lookup");

        let found = entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));

        match found {
            Some(Some(value)) => Some(value),
            Some(None) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: &str, value: String, ttl: Duration) {
        let expires_at = time::Duration::try_from(ttl)
            .ok()
            .and_then(|ttl| self.clock.now().checked_add(ttl));

        rw_write(&self.entries, "memory_store.insert")
            .put(key.to_string(), Entry { value, expires_at });
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, "memory_store.len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        Ok(self.lookup(key))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError> {
        self.insert(key, value, ttl);
        Ok(())
    }
}
