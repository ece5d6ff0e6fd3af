//! Infrastructure Layer
//!
//! Contains the I/O side of the client:
//! - HTTP transport and retry policy (reqwest)
//! - Pagination walkers, sequential and concurrent
//! - The shared API client handle
//! - File downloads

pub mod api;
pub mod download;
pub mod http;
pub mod pagination;
