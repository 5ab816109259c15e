//! Redis-backed cache store.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, RedisError, aio::ConnectionManager};

use crate::cache::{CacheStore, CacheStoreError};

/// Cache store on a shared, auto-reconnecting Redis connection.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, CacheStoreError> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(map_redis_error)?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        let mut connection = self.connection.clone();
        connection.get(key).await.map_err(map_redis_error)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError> {
        let mut connection = self.connection.clone();
        // Redis rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        connection
            .set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(map_redis_error)
    }
}

fn map_redis_error(err: RedisError) -> CacheStoreError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        CacheStoreError::Unavailable(err.to_string())
    } else {
        CacheStoreError::Command(err.to_string())
    }
}
