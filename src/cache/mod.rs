//! Folio cache system.
//!
//! Read-through caching for page content:
//!
//! - [`CacheStore`]: string key-value store with expiry ([`MemoryStore`] here,
//!   Redis in `infra::redis`)
//! - [`CacheAside`]: cache-aside accessor that never fails because of the store
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! backend = "memory"          # memory | redis | disabled
//! url = "redis://127.0.0.1/"  # required for redis
//! key_prefix = "folio"
//! default_ttl_seconds = 3600
//! memory_capacity = 256
//! ```

mod accessor;
mod config;
mod keys;
mod lock;
mod store;

pub use accessor::CacheAside;
pub use config::{CacheBackend, CacheConfig};
pub use keys::{CacheKey, EmptyKeyError};
pub use store::{CacheStore, CacheStoreError, Clock, ManualClock, MemoryStore, SystemClock};
