//! Fan-out event types.
//!
//! One variant per broker topic. Channel names and payload shapes are the
//! wire contract between server instances: every instance publishes events
//! it produces locally and subscribes to all topics so it can deliver
//! events, including ones produced elsewhere, to its own sockets.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, ConversationSummary};

/// Room message broadcast, delivered to members of the room channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    pub room: String,
    pub username: String,
    pub message: String,
}

/// Direct message, delivered to each username channel in `to`
/// (both participants, so the sender's other devices see it too).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmPayload {
    pub from: String,
    pub to: Vec<String>,
    pub message: String,
    pub timestamp: i64,
}

/// One page of history, delivered to the requesting socket only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviousMessagesPayload {
    pub socket_id: String,
    pub messages: Vec<ChatMessage>,
    pub page: i64,
    pub limit: i64,
    #[serde(rename = "totalMessages")]
    pub total_messages: i64,
}

/// A conversation list. `to` is a username or socket id; absent means
/// broadcast to everyone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub conversations: Vec<ConversationSummary>,
}

/// Typing indicator scoped to a room name or recipient username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingPayload {
    pub user: String,
    pub to: String,
}

/// Directive telling one specific connection to refresh its access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenPayload {
    pub socket_id: String,
}

/// An event on the fan-out bus.
#[derive(Debug, Clone)]
pub enum FanoutEvent {
    Chat(ChatPayload),
    Dm(DmPayload),
    PreviousMessages(PreviousMessagesPayload),
    Conversations(ConversationsPayload),
    RefreshConversations,
    Typing(TypingPayload),
    RefreshToken(RefreshTokenPayload),
}

impl FanoutEvent {
    /// All broker channels an instance must subscribe to.
    pub const CHANNELS: [&'static str; 7] = [
        "chat",
        "dm",
        "previousMessages",
        "conversations",
        "refreshConversations",
        "typing",
        "refreshToken",
    ];

    /// The broker channel this event is published on.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::Dm(_) => "dm",
            Self::PreviousMessages(_) => "previousMessages",
            Self::Conversations(_) => "conversations",
            Self::RefreshConversations => "refreshConversations",
            Self::Typing(_) => "typing",
            Self::RefreshToken(_) => "refreshToken",
        }
    }

    /// Serialize the payload for publishing.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Chat(p) => serde_json::to_string(p),
            Self::Dm(p) => serde_json::to_string(p),
            Self::PreviousMessages(p) => serde_json::to_string(p),
            Self::Conversations(p) => serde_json::to_string(p),
            Self::RefreshConversations => Ok("{}".to_string()),
            Self::Typing(p) => serde_json::to_string(p),
            Self::RefreshToken(p) => serde_json::to_string(p),
        }
    }

    /// Decode a payload received from the broker. `Ok(None)` means the
    /// channel is not one of ours.
    pub fn decode(channel: &str, payload: &str) -> Result<Option<Self>, serde_json::Error> {
        let event = match channel {
            "chat" => Self::Chat(serde_json::from_str(payload)?),
            "dm" => Self::Dm(serde_json::from_str(payload)?),
            "previousMessages" => Self::PreviousMessages(serde_json::from_str(payload)?),
            "conversations" => Self::Conversations(serde_json::from_str(payload)?),
            "refreshConversations" => Self::RefreshConversations,
            "typing" => Self::Typing(serde_json::from_str(payload)?),
            "refreshToken" => Self::RefreshToken(serde_json::from_str(payload)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_channel_decodes_back_to_its_variant() {
        let events = [
            FanoutEvent::Chat(ChatPayload {
                room: "general".into(),
                username: "alice".into(),
                message: "hi".into(),
            }),
            FanoutEvent::Dm(DmPayload {
                from: "alice".into(),
                to: vec!["bob".into(), "alice".into()],
                message: "hey".into(),
                timestamp: 1,
            }),
            FanoutEvent::RefreshConversations,
            FanoutEvent::Typing(TypingPayload {
                user: "alice".into(),
                to: "general".into(),
            }),
            FanoutEvent::RefreshToken(RefreshTokenPayload {
                socket_id: "s-1".into(),
            }),
        ];

        for event in events {
            let payload = event.to_payload().unwrap();
            let decoded = FanoutEvent::decode(event.channel(), &payload)
                .unwrap()
                .unwrap();
            assert_eq!(decoded.channel(), event.channel());
        }
    }

    #[test]
    fn unknown_channel_is_skipped() {
        assert!(FanoutEvent::decode("presence", "{}").unwrap().is_none());
    }

    #[test]
    fn previous_messages_uses_camel_case_total() {
        let payload = PreviousMessagesPayload {
            socket_id: "s-1".into(),
            messages: vec![],
            page: 1,
            limit: 20,
            total_messages: 47,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["totalMessages"], 47);
        assert_eq!(json["socket_id"], "s-1");
    }
}
