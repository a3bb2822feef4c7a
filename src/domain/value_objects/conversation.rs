//! Conversation key value object.
//!
//! A conversation is either a public room (`room:<name>`) or a canonical
//! two-party DM pairing (`dm:<lower>:<upper>`, usernames sorted
//! lexicographically so both participants derive the identical key).

use serde::{Deserialize, Serialize};

/// Conversation classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Room,
    Dm,
}

/// Canonical identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversationKey {
    Room(String),
    Dm {
        /// Lexicographically smaller participant
        lower: String,
        /// Lexicographically larger participant
        upper: String,
    },
}

impl ConversationKey {
    /// Key for a public room.
    pub fn room(name: &str) -> Self {
        Self::Room(name.to_string())
    }

    /// Canonical key for a two-party DM. Symmetric: argument order does not
    /// matter.
    pub fn dm(user_a: &str, user_b: &str) -> Self {
        let (lower, upper) = if user_a <= user_b {
            (user_a, user_b)
        } else {
            (user_b, user_a)
        };
        Self::Dm {
            lower: lower.to_string(),
            upper: upper.to_string(),
        }
    }

    /// Parse a stored key string back into a conversation key.
    pub fn parse(key: &str) -> Option<Self> {
        if let Some(name) = key.strip_prefix("room:") {
            if name.is_empty() {
                return None;
            }
            return Some(Self::Room(name.to_string()));
        }
        if let Some(pair) = key.strip_prefix("dm:") {
            let (a, b) = pair.split_once(':')?;
            if a.is_empty() || b.is_empty() {
                return None;
            }
            return Some(Self::dm(a, b));
        }
        None
    }

    /// Classify the conversation.
    pub fn kind(&self) -> ConversationKind {
        match self {
            Self::Room(_) => ConversationKind::Room,
            Self::Dm { .. } => ConversationKind::Dm,
        }
    }

    /// Whether `username` participates in this conversation. Rooms are
    /// public, so every user participates.
    pub fn involves(&self, username: &str) -> bool {
        match self {
            Self::Room(_) => true,
            Self::Dm { lower, upper } => lower == username || upper == username,
        }
    }

    /// Display name from `viewer`'s perspective: the room name, or the DM
    /// peer's username.
    pub fn display_name_for(&self, viewer: &str) -> String {
        match self {
            Self::Room(name) => name.clone(),
            Self::Dm { lower, upper } => {
                if lower == viewer {
                    upper.clone()
                } else {
                    lower.clone()
                }
            }
        }
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Room(name) => write!(f, "room:{}", name),
            Self::Dm { lower, upper } => write!(f, "dm:{}:{}", lower, upper),
        }
    }
}
