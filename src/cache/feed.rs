use std::sync::Arc;
use std::time::Duration;

use redis::{AsyncCommands, Client as RedisClient};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::keys::{FEED_EPOCH_KEY, feed_page_key};

/// Best-effort cache for rendered feed pages. Every operation swallows Redis
/// failures; a cold or unreachable cache only means the page is recomputed
/// from the database.
#[derive(Clone)]
pub struct FeedCache {
    redis: Arc<RedisClient>,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(redis: Arc<RedisClient>, ttl: Duration) -> Self {
        Self { redis, ttl }
    }

    pub fn from_state(state: &crate::AppState) -> Self {
        Self::new(state.redis.clone(), state.config.feed_cache_ttl())
    }

    pub async fn get_page<T: DeserializeOwned>(&self, scope: &str, page: u32) -> Option<T> {
        let mut conn = self.redis.get_multiplexed_async_connection().await.ok()?;
        let epoch: u64 = conn.get(FEED_EPOCH_KEY).await.unwrap_or(0);
        let key = feed_page_key(epoch, scope, page);

        let json_str: String = conn.get(&key).await.ok()?;
        match serde_json::from_str(&json_str) {
            Ok(value) => {
                tracing::debug!("Feed page served from cache: {}", key);
                Some(value)
            }
            Err(_) => None,
        }
    }

    pub async fn put_page<T: Serialize>(&self, scope: &str, page: u32, value: &T) {
        let Ok(mut conn) = self.redis.get_multiplexed_async_connection().await else {
            return;
        };
        let epoch: u64 = conn.get(FEED_EPOCH_KEY).await.unwrap_or(0);
        let key = feed_page_key(epoch, scope, page);

        if let Ok(json_str) = serde_json::to_string(value) {
            let result: Result<(), redis::RedisError> =
                conn.set_ex(&key, json_str, self.ttl.as_secs()).await;
            if result.is_ok() {
                tracing::debug!("Feed page cached: {}", key);
            }
        }
    }

    /// Invalidation hook for post writes. Bumping the epoch orphans every
    /// cached page at once; the orphans expire by TTL.
    pub async fn invalidate(&self) {
        let Ok(mut conn) = self.redis.get_multiplexed_async_connection().await else {
            return;
        };
        let result: Result<u64, redis::RedisError> = conn.incr(FEED_EPOCH_KEY, 1).await;
        match result {
            Ok(epoch) => tracing::debug!("Feed cache invalidated, epoch now {}", epoch),
            Err(e) => tracing::debug!("Feed cache invalidation skipped: {}", e),
        }
    }
}
