//! Middleware
//!
//! Tower middleware for request processing.

pub mod auth;
pub mod cors;
pub mod logging;
pub mod security;

pub use auth::{auth_middleware, AuthUser};
pub use security::{create_security_headers_layer, SecurityHeadersConfig, SecurityHeadersLayer};
