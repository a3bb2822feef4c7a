//! # Value Objects
//!
//! Immutable domain value types.

mod conversation;

pub use conversation::{ConversationKey, ConversationKind};
