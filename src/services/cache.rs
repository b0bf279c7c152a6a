//! Redis cache service
//!
//! Read-through cache for derived registration-mode and collection-status
//! lookups. The relational store stays the source of truth: a cache error
//! is logged and treated as a miss, and every write to a key space
//! invalidates its keys explicitly instead of waiting for TTL expiry.

use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::settings::Settings;
use crate::utils::errors::{EngineError, Result};

#[derive(Debug, Clone)]
pub struct CacheService {
    client: Client,
    settings: Settings,
}

impl CacheService {
    /// Create a new CacheService instance
    pub fn new(settings: Settings) -> Result<Self> {
        let client = Client::open(settings.redis.url.as_str()).map_err(EngineError::Redis)?;

        Ok(Self { client, settings })
    }

    async fn get_connection(&self) -> Result<redis::aio::Connection> {
        self.client
            .get_async_connection()
            .await
            .map_err(EngineError::Redis)
    }

    /// Set a value with TTL
    pub async fn set<T>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) -> Result<()>
    where
        T: Serialize,
    {
        let mut conn = self.get_connection().await?;
        let serialized = serde_json::to_string(value).map_err(EngineError::Serialization)?;

        let full_key = format!("{}{}", self.settings.redis.prefix, key);
        let ttl = ttl_seconds.unwrap_or(self.settings.redis.ttl_seconds);

        let _: () = conn
            .set_ex(&full_key, serialized, ttl)
            .await
            .map_err(EngineError::Redis)?;

        debug!(key = %full_key, ttl = ttl, "Value set in cache");
        Ok(())
    }

    /// Get a value
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.get_connection().await?;
        let full_key = format!("{}{}", self.settings.redis.prefix, key);

        let result: Option<String> = conn.get(&full_key).await.map_err(EngineError::Redis)?;

        match result {
            Some(data) => {
                let deserialized =
                    serde_json::from_str::<T>(&data).map_err(EngineError::Serialization)?;
                debug!(key = %full_key, "Cache hit");
                Ok(Some(deserialized))
            }
            None => {
                debug!(key = %full_key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let full_key = format!("{}{}", self.settings.redis.prefix, key);

        let deleted: i32 = conn.del(&full_key).await.map_err(EngineError::Redis)?;

        debug!(key = %full_key, deleted = deleted > 0, "Cache key invalidated");
        Ok(deleted > 0)
    }

    /// Get a value, degrading a cache failure to a miss.
    ///
    /// The store read behind a miss is authoritative, so a broken cache
    /// must never fail the operation.
    pub async fn try_get<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, falling through to store");
                None
            }
        }
    }

    /// Set a value, logging failures instead of propagating them
    pub async fn try_set<T>(&self, key: &str, value: &T, ttl_seconds: Option<u64>)
    where
        T: Serialize,
    {
        if let Err(e) = self.set(key, value, ttl_seconds).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    /// Invalidate a key, logging failures instead of propagating them
    pub async fn try_delete(&self, key: &str) {
        if let Err(e) = self.delete(key).await {
            warn!(key = %key, error = %e, "Cache invalidation failed");
        }
    }

    /// Health check for the cache connection
    pub async fn health_check(&self) -> Result<bool> {
        match self.get_connection().await {
            Ok(mut conn) => {
                let result: redis::RedisResult<String> =
                    redis::cmd("PING").query_async(&mut conn).await;
                match result {
                    Ok(response) => Ok(response == "PONG"),
                    Err(e) => {
                        warn!(error = %e, "Cache health check failed");
                        Ok(false)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Cache connection failed");
                Ok(false)
            }
        }
    }
}

/// Cache key for the derived registration mode of an (event, cohort) pair
pub fn registration_mode_key(event_id: i64, cohort_id: i64) -> String {
    format!("batch_mode:{}:{}", event_id, cohort_id)
}

/// Cache key for a collection's progress lookup
pub fn collection_status_key(collection_id: i64) -> String {
    format!("collection_status:{}", collection_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_are_scoped_per_pair() {
        assert_eq!(registration_mode_key(3, 9), "batch_mode:3:9");
        assert_eq!(collection_status_key(42), "collection_status:42");
        assert_ne!(registration_mode_key(3, 9), registration_mode_key(9, 3));
    }

    #[tokio::test]
    async fn cache_service_creation() {
        let settings = Settings::default();
        let result = CacheService::new(settings);

        // This will fail only on a malformed URL; connection is lazy
        assert!(result.is_ok());
    }
}
