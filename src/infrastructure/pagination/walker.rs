//! Sequential pagination walker.
//!
//! Each page waits for the previous one's final (retry-governed) response.
//!
//! - Unbounded: fetch offsets 0, P, 2P, ... and stop at the first page with no
//!   records. A page discarded as rate limited still advances the offset, so
//!   its records are skipped.
//! - Bounded: fetch exactly `max_items / P + 1` pages, whatever they contain.
//!   The result is not truncated to `max_items`.

use tracing::{debug, info, instrument, warn};

use super::params::{fetch_page, PageOutcome, PageRequest};
use crate::domain::value_objects::Record;
use crate::infrastructure::http::Transport;
use crate::shared::error::ClientError;

#[instrument(skip(transport, request), fields(path = %request.path, page_size = request.page_size))]
pub async fn walk(transport: &dyn Transport, request: &PageRequest) -> Result<Vec<Record>, ClientError> {
    request.validate()?;

    let records = match request.page_count() {
        None => walk_unbounded(transport, request).await?,
        Some(pages) => walk_bounded(transport, request, pages).await?,
    };

    info!(records = records.len(), "Sequential walk finished");
    Ok(records)
}

async fn walk_unbounded(
    transport: &dyn Transport,
    request: &PageRequest,
) -> Result<Vec<Record>, ClientError> {
    let mut records = Vec::new();
    let mut page = 0;

    loop {
        let api_request = request.page(page)?;
        match fetch_page(transport, &api_request).await? {
            PageOutcome::Discarded(status) => {
                warn!(page, status = %status, "Discarding rate-limited page");
            }
            PageOutcome::Records(batch) => {
                debug!(page, count = batch.len(), "Fetched page");
                if batch.is_empty() {
                    break;
                }
                records.extend(batch);
            }
        }
        page += 1;
    }

    Ok(records)
}

async fn walk_bounded(
    transport: &dyn Transport,
    request: &PageRequest,
    pages: usize,
) -> Result<Vec<Record>, ClientError> {
    let mut records = Vec::new();

    for page in 0..pages {
        let api_request = request.page(page)?;
        match fetch_page(transport, &api_request).await? {
            PageOutcome::Discarded(status) => {
                warn!(page, status = %status, "Discarding rate-limited page");
            }
            PageOutcome::Records(batch) => {
                debug!(page, count = batch.len(), "Fetched page");
                records.extend(batch);
            }
        }
    }

    Ok(records)
}
