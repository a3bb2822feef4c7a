//! Socket Gateway
//!
//! Real-time communication via WebSocket connections.

pub mod events;
pub mod gateway;
pub mod handler;

pub use events::{ClientEvent, ConversationEntry, ServerEvent};
pub use gateway::{ConnectedSocket, Gateway};
pub use handler::ws_handler;
