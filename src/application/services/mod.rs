//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: session issuing/rotation, JWT minting and validation
//! - **MessagingService**: persistence, pagination windows, fan-out publishing

pub mod auth_service;
pub mod messaging_service;

// Re-export auth service types
pub use auth_service::{AuthError, AuthService, AuthServiceImpl, Claims, TokenPair};

// Re-export messaging service types
pub use messaging_service::{MessagePage, MessagingService, MessagingServiceImpl};
