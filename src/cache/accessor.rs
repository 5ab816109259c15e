//! Cache-aside reads.
//!
//! [`CacheAside::get_with_cache`] answers from the store when it can and from
//! the producer otherwise. The store only ever affects latency: read failures
//! bypass it, write failures are logged and dropped, and the only error that
//! reaches the caller is the producer's own. Store calls that outlive the
//! operation timeout count as failures of the same kind.

use std::{future::Future, sync::Arc, time::Duration};

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::store::{CacheStore, CacheStoreError};

const METRIC_CACHE_HIT_TOTAL: &str = "folio_cache_hit_total";
const METRIC_CACHE_MISS_TOTAL: &str = "folio_cache_miss_total";
const METRIC_CACHE_READ_ERROR_TOTAL: &str = "folio_cache_read_error_total";
const METRIC_CACHE_WRITE_ERROR_TOTAL: &str = "folio_cache_write_error_total";

#[derive(Clone)]
pub struct CacheAside {
    store: Option<Arc<dyn CacheStore>>,
    default_ttl: Duration,
    operation_timeout: Duration,
}

impl CacheAside {
    pub fn new(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self {
            store: Some(store),
            default_ttl,
            operation_timeout: CacheConfig::default().operation_timeout,
        }
    }

    /// Accessor without a store: every call goes straight to the producer.
    pub fn disabled() -> Self {
        let defaults = CacheConfig::default();
        Self {
            store: None,
            default_ttl: defaults.default_ttl,
            operation_timeout: defaults.operation_timeout,
        }
    }

    pub fn from_config(config: &CacheConfig, store: Option<Arc<dyn CacheStore>>) -> Self {
        let store = store.filter(|_| config.is_enabled());
        Self {
            store,
            default_ttl: config.default_ttl,
            operation_timeout: config.operation_timeout,
        }
    }

    pub fn with_operation_timeout(mut self, operation_timeout: Duration) -> Self {
        self.operation_timeout = operation_timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub async fn get_with_default_ttl<T, E, F, Fut>(&self, key: &CacheKey, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_with_cache(key, producer, self.default_ttl).await
    }

    /// Return the cached value for `key`, or produce, store and return a fresh one.
    ///
    /// A failed or undecodable read skips the store entirely, including the
    /// write-back. A failed write is swallowed after it is logged.
    pub async fn get_with_cache<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        producer: F,
        ttl: Duration,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(store) = self.store.as_deref() else {
            return producer().await;
        };

        let read = bounded(self.operation_timeout, store.get(key.as_str())).await;
        match read {
            Ok(Some(cached)) => match serde_json::from_str::<T>(&cached) {
                Ok(value) => {
                    debug!(key = %key, "cache hit");
                    counter!(METRIC_CACHE_HIT_TOTAL, "key" => key.to_string()).increment(1);
                    return Ok(value);
                }
                Err(err) => {
                    warn!(
                        key = %key,
                        stage = "decode",
                        error = %err,
                        "Cached value could not be decoded; bypassing cache"
                    );
                    counter!(
                        METRIC_CACHE_READ_ERROR_TOTAL,
                        "key" => key.to_string(),
                        "stage" => "decode"
                    )
                    .increment(1);
                    return producer().await;
                }
            },
            Ok(None) => {
                debug!(key = %key, "cache miss");
                counter!(METRIC_CACHE_MISS_TOTAL, "key" => key.to_string()).increment(1);
            }
            Err(err) => {
                warn!(
                    key = %key,
                    stage = "read",
                    error = %err,
                    "Cache read failed; bypassing cache"
                );
                counter!(
                    METRIC_CACHE_READ_ERROR_TOTAL,
                    "key" => key.to_string(),
                    "stage" => "read"
                )
                .increment(1);
                return producer().await;
            }
        }

        let value = producer().await?;
        write_back(store, key, &value, ttl, self.operation_timeout).await;
        Ok(value)
    }
}

/// Run one store call, turning an overrun into [`CacheStoreError::TimedOut`].
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, CacheStoreError>>,
) -> Result<T, CacheStoreError> {
    timeout(limit, call)
        .await
        .unwrap_or_else(|_| Err(CacheStoreError::TimedOut(limit)))
}

async fn write_back<T: Serialize>(
    store: &dyn CacheStore,
    key: &CacheKey,
    value: &T,
    ttl: Duration,
    limit: Duration,
) {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(err) => {
            warn!(
                key = %key,
                stage = "encode",
                error = %err,
                "Fresh value could not be encoded; not caching"
            );
            counter!(
                METRIC_CACHE_WRITE_ERROR_TOTAL,
                "key" => key.to_string(),
                "stage" => "encode"
            )
            .increment(1);
            return;
        }
    };

    if let Err(err) = bounded(limit, store.set(key.as_str(), encoded, ttl)).await {
        warn!(
            key = %key,
            stage = "write",
            ttl_secs = ttl.as_secs(),
            error = %err,
            "Cache write failed; serving fresh value uncached"
        );
        counter!(
            METRIC_CACHE_WRITE_ERROR_TOTAL,
            "key" => key.to_string(),
            "stage" => "write"
        )
        .increment(1);
    }
}
