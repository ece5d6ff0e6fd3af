//! API client handle shared by services and entities.

mod client;

pub use client::{ApiClient, ClientOptions, DEFAULT_MAX_POSTS_LIMIT};
