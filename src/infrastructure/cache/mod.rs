//! Redis Connection Module
//!
//! Redis is both the backing store (users, sessions, message logs, recency
//! index) and the pub/sub broker. This module owns connection management and
//! the key naming scheme.

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Creates a Redis connection manager with automatic reconnection.
///
/// The connection manager handles connection pooling and automatic
/// reconnection when the connection is lost.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Key naming scheme for the single logical key space.
///
/// Use these helpers to ensure consistent key naming across the application.
pub mod keys {
    use crate::domain::ConversationKey;

    /// Prefix for user hashes (e.g., "user:alice")
    pub const USER: &str = "user:";

    /// Prefix for per-user session version records (e.g., "session:alice")
    pub const SESSION: &str = "session:";

    /// Prefix for per-conversation message logs (e.g., "chat:room:general")
    pub const MESSAGES: &str = "chat:";

    /// Sorted set mapping conversation key to last-activity millis
    pub const RECENCY_INDEX: &str = "conversations:lastActivity";

    /// Key for a user hash
    #[inline]
    pub fn user(username: &str) -> String {
        format!("{}{}", USER, username)
    }

    /// Key for a user's current session version
    #[inline]
    pub fn session(username: &str) -> String {
        format!("{}{}", SESSION, username)
    }

    /// Key for a conversation's message log
    #[inline]
    pub fn messages(key: &ConversationKey) -> String {
        format!("{}{}", MESSAGES, key)
    }
}

#[cfg(test)]
mod tests {
    use super::keys;
    use crate::domain::ConversationKey;

    #[test]
    fn message_log_keys_carry_the_conversation_key() {
        assert_eq!(
            keys::messages(&ConversationKey::room("general")),
            "chat:room:general"
        );
        assert_eq!(
            keys::messages(&ConversationKey::dm("bob", "alice")),
            "chat:dm:alice:bob"
        );
        assert_eq!(keys::session("alice"), "session:alice");
    }
}
