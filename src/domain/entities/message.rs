//! Chat message entity and message store trait.
//!
//! Messages are append-only JSON entries in a per-conversation Redis list,
//! ordered oldest first.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ConversationKey, ConversationKind};
use crate::shared::error::AppError;

/// A message in a room or DM log. Immutable once stored.
///
/// Field names follow the wire format clients already speak: `socket_id`
/// identifies the sending connection, `username` the authenticated sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub socket_id: String,

    /// Sender's username (always taken from the authenticated connection)
    pub username: String,

    pub message: String,

    /// Epoch milliseconds at send time
    pub timestamp: i64,

    #[serde(rename = "type")]
    pub kind: ConversationKind,

    /// Room name, for room messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    /// Sender, for DMs (duplicates `username` on the wire)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Recipient, for DMs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl ChatMessage {
    /// Build a room message.
    pub fn room(socket_id: &str, username: &str, room: &str, body: &str, timestamp: i64) -> Self {
        Self {
            socket_id: socket_id.to_string(),
            username: username.to_string(),
            message: body.to_string(),
            timestamp,
            kind: ConversationKind::Room,
            room: Some(room.to_string()),
            from: None,
            to: None,
        }
    }

    /// Build a direct message.
    pub fn direct(socket_id: &str, from: &str, to: &str, body: &str, timestamp: i64) -> Self {
        Self {
            socket_id: socket_id.to_string(),
            username: from.to_string(),
            message: body.to_string(),
            timestamp,
            kind: ConversationKind::Dm,
            room: None,
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }
}

/// Append-only ordered log per conversation.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append to the end of the conversation's log. When `retention` is
    /// bounded, the log is truncated to the most recent `retention` entries
    /// after the append.
    async fn append(
        &self,
        key: &ConversationKey,
        message: &ChatMessage,
        retention: Option<usize>,
    ) -> Result<(), AppError>;

    /// Number of messages currently stored for the conversation.
    async fn len(&self, key: &ConversationKey) -> Result<usize, AppError>;

    /// Zero-based inclusive slice over the oldest-to-newest log.
    /// An end before start yields an empty sequence.
    async fn range(
        &self,
        key: &ConversationKey,
        start: i64,
        end: i64,
    ) -> Result<Vec<ChatMessage>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_message_serializes_wire_fields() {
        let msg = ChatMessage::room("s-1", "alice", "general", "hi", 1_700_000_000_000);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["socket_id"], "s-1");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["room"], "general");
        assert_eq!(json["type"], "room");
        assert!(json.get("from").is_none());
        assert!(json.get("to").is_none());
    }

    #[test]
    fn dm_round_trips() {
        let msg = ChatMessage::direct("s-2", "alice", "bob", "hey", 1_700_000_000_001);
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(back, msg);
        assert_eq!(back.kind, ConversationKind::Dm);
    }
}
