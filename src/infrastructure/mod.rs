//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Redis-backed stores (users, sessions, message logs, recency index)
//! - The Redis pub/sub fan-out bus
//! - Prometheus metrics

pub mod bus;
pub mod cache;
pub mod metrics;
pub mod repositories;
