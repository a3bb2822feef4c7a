//! Data Transfer Objects
//!
//! Request and response structures for the HTTP API.

pub mod request;
pub mod response;
