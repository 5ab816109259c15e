//! Cache configuration.
//!
//! Selects the cache backend and tunes the cache-aside accessor. Resolved from
//! the `[cache]` section of `folio.toml`.

use std::{fmt, num::NonZeroUsize, str::FromStr, time::Duration};

const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_KEY_PREFIX: &str = "folio";
const DEFAULT_MEMORY_CAPACITY: usize = 256;
const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 500;

/// Which store sits behind the cache-aside accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    /// In-process LRU store.
    #[default]
    Memory,
    /// Networked Redis store.
    Redis,
    /// No store; every read goes to the document store.
    Disabled,
}

impl CacheBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheBackend::Memory => "memory",
            CacheBackend::Redis => "redis",
            CacheBackend::Disabled => "disabled",
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            "disabled" | "none" | "off" => Ok(CacheBackend::Disabled),
            other => Err(format!(
                "unknown cache backend `{other}` (expected memory, redis or disabled)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Namespace prepended to every cache key (`<prefix>:<name>`).
    pub key_prefix: String,
    /// Expiry applied when callers do not pass their own TTL.
    pub default_ttl: Duration,
    /// Maximum entries held by the in-memory store.
    pub memory_capacity: NonZeroUsize,
    /// Longest the accessor waits on one store read or write.
    pub operation_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            default_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            memory_capacity: NonZeroUsize::new(DEFAULT_MEMORY_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            backend: settings.backend,
            key_prefix: settings.key_prefix.clone(),
            default_ttl: settings.default_ttl,
            memory_capacity: settings.memory_capacity,
            operation_timeout: settings.operation_timeout,
        }
    }
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        self.backend != CacheBackend::Disabled
    }
}
