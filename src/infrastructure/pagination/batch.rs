//! Concurrent batch fetcher.
//!
//! Same contract as the sequential walker, but pages are requested in windows.
//! A window is an indivisible unit: all of its requests are spawned, at most
//! `concurrency` of them in flight at once, and the window is joined before
//! any of its results are read. Results are consumed in window order, never
//! completion order.
//!
//! Unbounded walks detect the end of data only after a full window has been
//! drained, so they may request up to one window of pages past the end.
//! Spawned requests run to completion even if the caller drops the walk.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::params::{fetch_page, PageOutcome, PageRequest};
use crate::domain::value_objects::Record;
use crate::infrastructure::http::{ApiRequest, Transport};
use crate::shared::error::ClientError;

/// Default number of pages per lookahead window.
pub const DEFAULT_WINDOW: usize = 50;

/// Default number of in-flight requests inside a window.
pub const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub window: usize,
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

#[instrument(skip(transport, request), fields(path = %request.path, page_size = request.page_size))]
pub async fn walk_concurrent(
    transport: Arc<dyn Transport>,
    request: &PageRequest,
    config: BatchConfig,
) -> Result<Vec<Record>, ClientError> {
    request.validate()?;
    let concurrency = config.concurrency.max(1);

    let records = match request.page_count() {
        Some(pages) => {
            let requests = (0..pages)
                .map(|page| request.page(page))
                .collect::<Result<Vec<_>, _>>()?;
            let outcomes = run_window(&transport, requests, concurrency).await?;

            let mut records = Vec::new();
            for (page, outcome) in outcomes.into_iter().enumerate() {
                collect(page, outcome, &mut records);
            }
            records
        }
        None => walk_windows(&transport, request, config.window.max(1), concurrency).await?,
    };

    info!(records = records.len(), "Concurrent walk finished");
    Ok(records)
}

async fn walk_windows(
    transport: &Arc<dyn Transport>,
    request: &PageRequest,
    window: usize,
    concurrency: usize,
) -> Result<Vec<Record>, ClientError> {
    let mut records = Vec::new();
    let mut cursor = 0;
    let mut exhausted = false;

    while !exhausted {
        let requests = (cursor..cursor + window)
            .map(|page| request.page(page))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(first_page = cursor, window, "Dispatching window");

        let outcomes = run_window(transport, requests, concurrency).await?;
        for (index, outcome) in outcomes.into_iter().enumerate() {
            if outcome.is_empty_page() {
                exhausted = true;
            }
            collect(cursor + index, outcome, &mut records);
        }

        cursor += window;
    }

    Ok(records)
}

fn collect(page: usize, outcome: PageOutcome, records: &mut Vec<Record>) {
    match outcome {
        PageOutcome::Records(batch) => records.extend(batch),
        PageOutcome::Discarded(status) => {
            warn!(page, status = %status, "Discarding rate-limited page");
        }
    }
}

/// Spawn every request of a window behind a semaphore and join them all.
///
/// The first error in window order is returned once the whole window settled.
async fn run_window(
    transport: &Arc<dyn Transport>,
    requests: Vec<ApiRequest>,
    concurrency: usize,
) -> Result<Vec<PageOutcome>, ClientError> {
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let handles = requests.into_iter().map(|api_request| {
        let transport = Arc::clone(transport);
        let semaphore = Arc::clone(&semaphore);
        tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| ClientError::Internal(e.to_string()))?;
            fetch_page(transport.as_ref(), &api_request).await
        })
    });

    let settled = join_all(handles).await;

    let mut outcomes = Vec::with_capacity(settled.len());
    let mut first_error = None;
    for joined in settled {
        match joined {
            Ok(Ok(outcome)) => outcomes.push(outcome),
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            Err(e) => {
                first_error.get_or_insert(ClientError::Internal(format!("page task failed: {}", e)));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(outcomes),
    }
}
