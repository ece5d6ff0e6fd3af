//! API client handle.
//!
//! `ApiClient` bundles the (retrying) transport with the resolved endpoints and
//! fetch settings. It is cheap to clone; every entity that can lazily fetch
//! related resources keeps one.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::FetchSettings;
use crate::domain::value_objects::{Endpoints, Record};
use crate::infrastructure::http::{ApiRequest, ApiResponse, Transport};
use crate::infrastructure::pagination::{fetch_records, BatchConfig, FetchMode, PageRequest};
use crate::shared::error::ClientError;

/// Default upper bound for the global post listing.
pub const DEFAULT_MAX_POSTS_LIMIT: usize = 1000;

/// Tunables the client applies to every walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub batch: BatchConfig,
    pub max_posts_limit: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            max_posts_limit: DEFAULT_MAX_POSTS_LIMIT,
        }
    }
}

impl From<&FetchSettings> for ClientOptions {
    fn from(settings: &FetchSettings) -> Self {
        Self {
            batch: BatchConfig {
                window: settings.batch_window,
                concurrency: settings.batch_concurrency,
            },
            max_posts_limit: settings.max_posts_limit,
        }
    }
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    options: ClientOptions,
}

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, endpoints: Endpoints, options: ClientOptions) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                endpoints,
                options,
            }),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    pub fn options(&self) -> ClientOptions {
        self.inner.options
    }

    /// Map the caller's "concurrent" choice onto a fetch mode.
    pub fn fetch_mode(&self, concurrent: bool) -> FetchMode {
        if concurrent {
            FetchMode::Concurrent(self.inner.options.batch)
        } else {
            FetchMode::Sequential
        }
    }

    pub async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.inner.transport.call(request).await
    }

    /// GET a single JSON document; 404 yields `None`.
    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ClientError> {
        let response = self.call(&ApiRequest::api(path)).await?;

        if response.is_not_found() {
            debug!("Resource not found");
            return Ok(None);
        }
        if !response.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: response.status,
                path: path.to_string(),
            });
        }

        response.json().map(Some)
    }

    /// GET an unpaginated list of records; 404 yields an empty list.
    pub async fn get_records(&self, path: &str) -> Result<Vec<Record>, ClientError> {
        Ok(self.get_json::<Vec<Record>>(path).await?.unwrap_or_default())
    }

    /// GET and report only the status.
    pub async fn get_status(&self, path: &str) -> Result<StatusCode, ClientError> {
        Ok(self.call(&ApiRequest::api(path)).await?.status)
    }

    pub async fn get_text(&self, path: &str) -> Result<String, ClientError> {
        let response = self.call(&ApiRequest::api(path)).await?;
        if !response.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: response.status,
                path: path.to_string(),
            });
        }
        Ok(response.text())
    }

    /// Walk a paginated resource.
    pub async fn walk(&self, request: &PageRequest, mode: FetchMode) -> Result<Vec<Record>, ClientError> {
        fetch_records(&self.inner.transport, request, mode).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoints", &self.inner.endpoints)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
