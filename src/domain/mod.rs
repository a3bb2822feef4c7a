//! # Domain Layer
//!
//! The domain layer contains the core business logic of the chat relay.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (User, ChatMessage, ConversationSummary)
//! - **value_objects**: Immutable value types (ConversationKey)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Store implementations live in the infrastructure layer

pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
