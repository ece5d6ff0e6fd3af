//! # Kemono Client Library
//!
//! A client for the Kemono archive API with:
//! - Offset pagination, sequential or in bounded concurrent batches
//! - Transport-level retry with backoff against rate limiting
//! - A lazily populated entity graph (creators, posts, channels, messages)
//! - Streaming file downloads with digest verification
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, value objects and the client-side date filter
//! - **Application Layer**: Top-level archive lookups
//! - **Infrastructure Layer**: HTTP transport, retry, pagination and downloads
//!
//! ## Module Structure
//!
//! ```text
//! kemono_client/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, lazy fields
//! +-- application/    Archive service
//! +-- infrastructure/ Transport, pagination, API client, downloads
//! +-- shared/         Error types
//! ```

// Configuration module
pub mod config;

// Domain layer - Entity graph
pub mod domain;

// Application layer - Archive lookups
pub mod application;

// Infrastructure layer - HTTP and disk I/O
pub mod infrastructure;

// Shared utilities
pub mod shared;

// Client stack wiring
pub mod startup;

// Telemetry and observability
pub mod telemetry;
