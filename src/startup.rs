//! Client Startup
//!
//! Wires settings into the transport stack, the shared API client and the
//! services built on top of it.

use std::sync::Arc;

use tracing::info;

use crate::application::services::ArchiveServiceImpl;
use crate::config::Settings;
use crate::infrastructure::api::{ApiClient, ClientOptions};
use crate::infrastructure::download::FileDownloader;
use crate::infrastructure::http::{HttpTransport, RetryPolicy, RetryingTransport, Transport};
use crate::shared::error::ClientError;

/// Everything a caller needs to talk to the archive.
#[derive(Debug, Clone)]
pub struct Application {
    pub client: ApiClient,
    pub archive: Arc<ArchiveServiceImpl>,
    pub downloader: Arc<FileDownloader>,
    pub settings: Arc<Settings>,
}

impl Application {
    /// Build the client stack from settings
    pub fn build(settings: Settings) -> Result<Self, ClientError> {
        let endpoints = settings.api.endpoints();

        let http = HttpTransport::new(endpoints.clone(), &settings.http)?;
        let policy = RetryPolicy::from_settings(&settings.retry);
        let transport: Arc<dyn Transport> = Arc::new(RetryingTransport::new(Arc::new(http), policy));

        let client = ApiClient::new(transport, endpoints, ClientOptions::from(&settings.fetch));
        let archive = Arc::new(ArchiveServiceImpl::new(client.clone()));
        let downloader = Arc::new(FileDownloader::from_settings(
            &settings.http,
            &settings.retry,
            &settings.download,
        )?);

        info!(
            api = %settings.api.api_url,
            max_retries = settings.retry.max_retries,
            batch_window = settings.fetch.batch_window,
            "Client stack ready"
        );

        Ok(Self {
            client,
            archive,
            downloader,
            settings: Arc::new(settings),
        })
    }
}
