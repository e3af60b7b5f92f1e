//! # Pairchat Server Library
//!
//! This crate provides the real-time messaging backend of a social networking
//! platform:
//! - WebSocket hub routing private messages between two-party conversations
//! - In-memory presence tracking across a user's open connections
//! - RESTful message endpoints sharing the hub's pagination contract
//! - PostgreSQL for the persistent message and group store
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database and metrics implementations
//! - **Presentation Layer**: HTTP handlers and the WebSocket hub
//!
//! ## Module Structure
//!
//! ```text
//! pairchat_server/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities and traits
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Database and metrics implementations
//! +-- presentation/  HTTP routes and the WebSocket hub
//! +-- shared/        Common utilities (errors, pagination, snowflake IDs)
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
