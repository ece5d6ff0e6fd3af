//! Pagination
//!
//! Walks offset-paginated resources into a flat list of raw records, either
//! sequentially ([`walker`]) or in concurrent windows ([`batch`]).

pub mod batch;
pub mod params;
pub mod walker;

use std::sync::Arc;

pub use batch::{walk_concurrent, BatchConfig};
pub use params::{PageOutcome, PageParams, PageRequest};
pub use walker::walk;

use crate::domain::value_objects::Record;
use crate::infrastructure::http::Transport;
use crate::shared::error::ClientError;

/// Page size of creator posts, the global post listing and search results.
pub const POSTS_PAGE_SIZE: usize = 50;

/// Page size of Discord channel messages.
pub const MESSAGES_PAGE_SIZE: usize = 150;

/// How a walk issues its page requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// One page at a time
    #[default]
    Sequential,
    /// Lookahead windows; best kept to moderately sized result sets
    Concurrent(BatchConfig),
}

/// Walk `request` with the chosen strategy.
pub async fn fetch_records(
    transport: &Arc<dyn Transport>,
    request: &PageRequest,
    mode: FetchMode,
) -> Result<Vec<Record>, ClientError> {
    match mode {
        FetchMode::Sequential => walk(transport.as_ref(), request).await,
        FetchMode::Concurrent(config) => walk_concurrent(Arc::clone(transport), request, config).await,
    }
}
