use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::errors::CacheError;

/// Queue the downstream worker pool consumes from
pub const PROCESSING_QUEUE_KEY: &str = "event_processing_queue";

/// Message handed off to the enrichment worker after commit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEnvelope {
    pub tenant_id: String,
    pub event_id: String,
    /// When the write path enqueued the message (ISO 8601)
    pub enqueued_at: String,
}

impl QueueEnvelope {
    pub fn new(tenant_id: &str, event_id: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            event_id: event_id.to_string(),
            enqueued_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Seam over the post-ingest hand-off
///
/// The write path treats enqueue as best-effort: the event row is already
/// durable and a sweeper re-queues stragglers, so failures are logged by the
/// caller and never propagated to the client.
#[async_trait]
pub trait EventQueue: Send + Sync {
    async fn enqueue(&self, tenant_id: &str, event_id: &str) -> Result<(), CacheError>;
}

/// Production hand-off pushing onto a Redis list
pub struct RedisEventQueue {
    conn: ConnectionManager,
    queue_key: String,
}

impl RedisEventQueue {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            queue_key: PROCESSING_QUEUE_KEY.to_string(),
        }
    }
}

#[async_trait]
impl EventQueue for RedisEventQueue {
    async fn enqueue(&self, tenant_id: &str, event_id: &str) -> Result<(), CacheError> {
        let envelope = QueueEnvelope::new(tenant_id, event_id);
        let message = serde_json::to_string(&envelope)
            .map_err(|e| CacheError::unavailable("enqueue_serialize", e))?;

        let mut conn = self.conn.clone();
        let _: () = conn
            .lpush(&self.queue_key, message)
            .await
            .map_err(|e| CacheError::unavailable("enqueue", e))?;

        Ok(())
    }
}

/// In-process hand-off for tests
#[derive(Default)]
pub struct InMemoryEventQueue {
    entries: Mutex<Vec<QueueEnvelope>>,
}

impl InMemoryEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drained(&self) -> Vec<QueueEnvelope> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventQueue for InMemoryEventQueue {
    async fn enqueue(&self, tenant_id: &str, event_id: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .push(QueueEnvelope::new(tenant_id, event_id));
        Ok(())
    }
}
