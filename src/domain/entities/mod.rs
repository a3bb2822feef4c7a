//! # Domain Entities
//!
//! Core domain entities of the chat relay.
//!
//! - **User**: account record used purely for authentication
//! - **ChatMessage**: an immutable message in a room or DM log
//! - **ConversationSummary**: a list entry derived from the recency index
//!
//! ## Repository Traits
//!
//! Each entity file also carries the trait defining its data access
//! operations. The traits are implemented in the infrastructure layer,
//! following the dependency inversion principle.

mod conversation;
mod message;
mod session;
mod user;

pub use conversation::{ConversationSummary, RecencyIndex};
pub use message::{ChatMessage, MessageStore};
pub use session::SessionStore;
pub use user::{User, UserRepository};
