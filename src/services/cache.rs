use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::TravelMode;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier cache for upstream lookups
///
/// L1 is an in-process moka cache. L2 is Redis and only present when a
/// Redis URL is configured. `get` reports an absent key as
/// `CacheError::CacheMiss` and returns Redis or decode failures as errors;
/// callers decide whether to fall back to the upstream.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            ..Self::in_memory(l1_size, ttl_secs)
        })
    }

    /// Create an L1-only cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl_secs,
        }
    }

    pub fn has_l2(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);
                self.l1_cache
                    .insert(key.to_string(), json.as_bytes().to_vec())
                    .await;
                return Ok(serde_json::from_str(&json)?);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in every configured tier
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;
        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both cache tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut *conn)
                .await?;
        }
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            l1_size: self.l1_cache.entry_count(),
            l2_enabled: self.has_l2(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub l1_size: u64,
    pub l2_enabled: bool,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key of one origin/destination travel estimate
    pub fn travel(origin: &str, destination: &str, mode: TravelMode) -> String {
        format!(
            "travel:{}:{}:{}",
            mode.as_str(),
            urlencoding::encode(origin.trim()),
            urlencoding::encode(destination.trim())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TravelEstimate;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get_redis() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        let key = "test_key";
        let value = "test_value";

        cache.set(key, &value).await.unwrap();
        let result: String = cache.get(key).await.unwrap();
        assert_eq!(result, value);

        cache.delete(key).await.unwrap();
        assert!(cache.get::<String>(key).await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_cache_round_trip() {
        let cache = CacheManager::in_memory(100, 60);
        let key = CacheKey::travel("名古屋駅", "豊田市", TravelMode::Driving);
        let estimate = TravelEstimate {
            distance_m: Some(32_000),
            duration_s: Some(2_400),
            distance_text: "32 km".to_string(),
            duration_text: "40分".to_string(),
        };

        assert!(matches!(
            cache.get::<TravelEstimate>(&key).await,
            Err(CacheError::CacheMiss(_))
        ));

        cache.set(&key, &estimate).await.unwrap();
        let cached: TravelEstimate = cache.get(&key).await.unwrap();
        assert_eq!(cached, estimate);
        assert!(!cache.stats().l2_enabled);

        cache.delete(&key).await.unwrap();
        assert!(cache.get::<TravelEstimate>(&key).await.is_err());
    }

    #[test]
    fn test_travel_key_layout() {
        assert_eq!(
            CacheKey::travel("Tokyo Station", "Osaka", TravelMode::Transit),
            "travel:transit:Tokyo%20Station:Osaka"
        );
        assert_ne!(
            CacheKey::travel("a", "b", TravelMode::Driving),
            CacheKey::travel("a", "b", TravelMode::Walking)
        );
    }
}
