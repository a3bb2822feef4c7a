//! Repository Implementations
//!
//! Redis-backed implementations of the domain repository traits.

mod message_store;
mod recency_index;
mod session_store;
mod user_repository;

pub use message_store::RedisMessageStore;
pub use recency_index::RedisRecencyIndex;
pub use session_store::RedisSessionStore;
pub use user_repository::RedisUserRepository;
