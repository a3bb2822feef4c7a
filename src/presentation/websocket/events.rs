//! Socket Wire Events
//!
//! Tagged frame formats for the socket protocol. Every frame is a JSON
//! object `{"event": ..., "data": ...}`; the tag picks the variant, so
//! dispatch is a typed match rather than string comparison on arbitrary
//! event names. A frame whose tag is unknown fails to deserialize and is
//! dropped by the connection handler.

use serde::{Deserialize, Serialize};

use crate::domain::{ConversationSummary, ConversationKind};

fn default_page() -> i64 {
    1
}

/// Client-to-server frames.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Request the caller's conversation list
    GetConversations,

    /// Enter a room and request one page of its history
    JoinRoom {
        room: String,
        #[serde(default = "default_page")]
        page: i64,
        /// Falls back to the configured default page size when omitted
        limit: Option<i64>,
        /// Messages the client has watched arrive since its pagination
        /// snapshot; keeps older pages stable under concurrent appends
        #[serde(default)]
        skip: i64,
    },

    /// Open a DM thread and request one page of its history
    JoinFriend {
        friend: String,
        #[serde(default = "default_page")]
        page: i64,
        limit: Option<i64>,
        #[serde(default)]
        skip: i64,
    },

    /// Send a message to a room
    Message { room: String, message: String },

    /// Send a direct message
    Dm { to: String, content: String },

    /// Typing indicator; data is the room name or recipient username
    Typing(String),
}

/// Server-to-client frames.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// The receiving user's conversation list, most recent first
    Conversations(Vec<ConversationEntry>),

    /// The receiver's conversation list may be stale; re-request it
    RefreshConversations,

    /// One page of history for a joined conversation
    #[serde(rename_all = "camelCase")]
    PreviousMessages {
        messages: Vec<crate::domain::ChatMessage>,
        page: i64,
        limit: i64,
        total_messages: i64,
    },

    /// A room message from another member
    Message { username: String, message: String },

    /// An incoming direct message
    Dm {
        username: String,
        message: String,
        timestamp: i64,
    },

    /// Someone is typing in a conversation the receiver is part of
    Typing { username: String, to: String },

    /// Directive to refresh the access token before it lapses
    RefreshToken,
}

/// One conversation list entry as sent to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
}

impl From<ConversationSummary> for ConversationEntry {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            name: summary.name,
            kind: summary.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn join_room_defaults_page_and_skip() {
        let frame: ClientEvent =
            serde_json::from_str(r#"{"event":"joinRoom","data":{"room":"general"}}"#).unwrap();

        match frame {
            ClientEvent::JoinRoom {
                room,
                page,
                limit,
                skip,
            } => {
                assert_eq!(room, "general");
                assert_eq!(page, 1);
                assert_eq!(limit, None);
                assert_eq!(skip, 0);
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn typing_carries_the_target_directly() {
        let frame: ClientEvent =
            serde_json::from_str(r#"{"event":"typing","data":"general"}"#).unwrap();
        assert!(matches!(frame, ClientEvent::Typing(t) if t == "general"));
    }

    #[test]
    fn unknown_event_tag_fails_to_parse() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"event":"shutdown","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn server_frames_are_tagged() {
        let frame = ServerEvent::Message {
            username: "alice".into(),
            message: "hi".into(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["event"], "message");
        assert_eq!(json["data"]["username"], "alice");

        let frame = ServerEvent::RefreshToken;
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["event"], "refreshToken");
    }

    #[test]
    fn previous_messages_uses_camel_case_total() {
        let frame = ServerEvent::PreviousMessages {
            messages: vec![],
            page: 2,
            limit: 10,
            total_messages: 35,
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["data"]["totalMessages"], 35);
    }
}
