//! Common Test Utilities
//!
//! A client stack pointed at a local mock server, plus record fixtures.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use wiremock::MockServer;

use kemono_client::application::services::ArchiveServiceImpl;
use kemono_client::domain::Endpoints;
use kemono_client::infrastructure::api::{ApiClient, ClientOptions};
use kemono_client::infrastructure::download::FileDownloader;
use kemono_client::infrastructure::http::{HttpTransport, RetryPolicy, RetryingTransport, Transport};

/// Path prefix the API lives under on the mock server.
pub const API: &str = "/api/v1";

/// Client stack against a mock server
pub struct TestApp {
    pub server: MockServer,
    pub endpoints: Endpoints,
    pub client: ApiClient,
    pub archive: ArchiveServiceImpl,
}

impl TestApp {
    /// Start a mock server and build a retrying client for it
    pub async fn spawn() -> Self {
        Self::with_policy(fast_policy(10)).await
    }

    pub async fn with_policy(policy: RetryPolicy) -> Self {
        let server = MockServer::start().await;
        let endpoints = Endpoints::single(&server.uri());

        let http = HttpTransport::with_client(reqwest::Client::new(), endpoints.clone());
        let transport: Arc<dyn Transport> = Arc::new(RetryingTransport::new(Arc::new(http), policy));
        let client = ApiClient::new(transport, endpoints.clone(), ClientOptions::default());
        let archive = ArchiveServiceImpl::new(client.clone());

        Self {
            server,
            endpoints,
            client,
            archive,
        }
    }

    pub fn downloader(&self) -> FileDownloader {
        FileDownloader::new(reqwest::Client::new(), fast_policy(3))
    }
}

/// Retry policy with millisecond delays and no `Retry-After` handling.
pub fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff_factor: Duration::from_millis(1),
        backoff_multiplier: 1.0,
        max_backoff: Duration::from_millis(5),
        respect_retry_after: false,
        ..RetryPolicy::default()
    }
}

/// API path for a resource
pub fn api(path: &str) -> String {
    format!("{}{}", API, path)
}

pub fn profile(service: &str, id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("creator {}", id),
        "service": service,
        "indexed": "2023-01-01T00:00:00.000000",
        "updated": "2024-06-01T12:30:00.000000",
        "public_id": id,
        "favorited": 3
    })
}

pub fn post(service: &str, creator_id: &str, id: usize) -> Value {
    json!({
        "id": id.to_string(),
        "user": creator_id,
        "service": service,
        "title": format!("post {}", id),
        "content": "",
        "published": "2024-01-01T00:00:00",
        "file": {},
        "attachments": []
    })
}

/// Posts with ids `start..end`
pub fn posts(service: &str, creator_id: &str, start: usize, end: usize) -> Value {
    Value::Array((start..end).map(|id| post(service, creator_id, id)).collect())
}

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Content-addressed data path for a digest
pub fn digest_path(digest: &str, extension: &str) -> String {
    format!("/data/{}/{}/{}{}", &digest[0..2], &digest[2..4], digest, extension)
}
