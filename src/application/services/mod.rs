//! Application Services
//!
//! Operations that coordinate the API client and the entity graph.
//!
//! ## Available Services
//!
//! - **ArchiveService**: Creator index, global posts, profile and digest lookups

pub mod archive_service;

pub use archive_service::{ArchiveService, ArchiveServiceImpl, GlobalPostQuery};
