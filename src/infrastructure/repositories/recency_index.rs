//! Recency Index Implementation
//!
//! Redis implementation of the RecencyIndex trait: a single sorted set
//! scoring each conversation key by its last-activity time, read back in
//! descending score order for most-recent-first listings.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::{ConversationKey, RecencyIndex};
use crate::infrastructure::cache::keys;
use crate::shared::error::AppError;

/// Redis sorted-set recency index.
#[derive(Clone)]
pub struct RedisRecencyIndex {
    conn: ConnectionManager,
}

impl RedisRecencyIndex {
    /// Create a new RedisRecencyIndex with the given connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RecencyIndex for RedisRecencyIndex {
    async fn touch(&self, key: &ConversationKey, at_ms: i64) -> Result<(), AppError> {
        let mut conn = self.conn.clone();

        let _: () = conn
            .zadd(keys::RECENCY_INDEX, key.to_string(), at_ms)
            .await?;
        Ok(())
    }

    async fn most_recent_first(&self) -> Result<Vec<String>, AppError> {
        let mut conn = self.conn.clone();

        let keys: Vec<String> = conn.zrevrange(keys::RECENCY_INDEX, 0, -1).await?;
        Ok(keys)
    }
}
