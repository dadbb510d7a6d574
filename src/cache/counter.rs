use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Script;

use crate::errors::CacheError;

/// Atomic increment of a fixed-window counter, setting the expiry only on
/// the 0 -> 1 transition so the window cannot be extended by later traffic.
/// One server-side round trip.
///
/// KEYS[1] -> ratelimit:{tenant_id}:{window}
/// ARGV[1] -> window TTL in seconds
/// Returns the post-increment counter value.
const INCREMENT_WINDOW: &str = r#"
    local count = redis.call("INCR", KEYS[1])
    if count == 1 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
    end
    return count
"#;

/// Seam over the shared cache's counter primitive
#[async_trait]
pub trait WindowCounter: Send + Sync {
    /// Increment `key` and return the post-increment value; the key expires
    /// `ttl_secs` after its first increment.
    async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u64, CacheError>;
}

/// Production counter backed by Redis
pub struct RedisWindowCounter {
    conn: ConnectionManager,
    script: Script,
}

impl RedisWindowCounter {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            script: Script::new(INCREMENT_WINDOW),
        }
    }
}

#[async_trait]
impl WindowCounter for RedisWindowCounter {
    async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        self.script
            .key(key)
            .arg(ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CacheError::unavailable("increment_window", e))
    }
}

/// In-process counter for tests and single-node development
///
/// Keys never expire; window rollover already yields a fresh key every
/// minute, which is all the short-lived callers need.
#[derive(Default)]
pub struct InMemoryWindowCounter {
    counters: Mutex<HashMap<String, u64>>,
}

impl InMemoryWindowCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, key: &str) -> Option<u64> {
        self.counters.lock().unwrap().get(key).copied()
    }
}

#[async_trait]
impl WindowCounter for InMemoryWindowCounter {
    async fn increment(&self, key: &str, _ttl_secs: u64) -> Result<u64, CacheError> {
        let mut counters = self.counters.lock().unwrap();
        let count = counters.entry(key.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_counter_increments_per_key() {
        let counter = InMemoryWindowCounter::new();

        assert_eq!(counter.increment("a", 60).await.unwrap(), 1);
        assert_eq!(counter.increment("a", 60).await.unwrap(), 2);
        assert_eq!(counter.increment("b", 60).await.unwrap(), 1);
    }
}
