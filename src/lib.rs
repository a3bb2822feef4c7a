//! # Chat Relay Library
//!
//! This crate provides a broker-backed real-time chat server with:
//! - RESTful HTTP API for authentication
//! - WebSocket gateway for rooms, direct messages, and typing indicators
//! - Redis for storage and pub/sub fan-out across server instances
//!
//! Any number of stateless instances share one Redis deployment and present
//! a single logical chat space: every instance publishes the events it
//! produces and subscribes to all of them, delivering each to whichever of
//! its local sockets the event addresses.
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Redis stores, the fan-out bus, and metrics
//! - **Presentation Layer**: HTTP handlers and the WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! chat_relay/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities, value objects, and traits
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Redis stores, fan-out bus, and metrics
//! +-- presentation/  HTTP routes and WebSocket handlers
//! +-- shared/        Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
