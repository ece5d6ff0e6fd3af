//! In-crate transport double that answers by path.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value;

use super::{ApiRequest, ApiResponse, Transport};
use crate::shared::error::ClientError;

type RouteKey = (String, Option<String>);

/// Serves fixed responses keyed by request path (and optionally offset) and
/// records every call.
///
/// Lookup tries `(path, o)` first, then the bare path. Unknown routes answer 404.
#[derive(Default)]
pub(crate) struct StubTransport {
    routes: HashMap<RouteKey, (StatusCode, Vec<u8>)>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn json(self, path: &str, body: Value) -> Self {
        self.route(path, None, StatusCode::OK, body.to_string().into_bytes())
    }

    /// Answer one page of a paginated resource.
    pub(crate) fn page(self, path: &str, offset: usize, body: Value) -> Self {
        self.route(
            path,
            Some(offset.to_string()),
            StatusCode::OK,
            body.to_string().into_bytes(),
        )
    }

    pub(crate) fn status(self, path: &str, status: StatusCode) -> Self {
        self.route(path, None, status, Vec::new())
    }

    pub(crate) fn text(self, path: &str, body: &str) -> Self {
        self.route(path, None, StatusCode::OK, body.as_bytes().to_vec())
    }

    fn route(mut self, path: &str, offset: Option<String>, status: StatusCode, body: Vec<u8>) -> Self {
        self.routes.insert((path.to_string(), offset), (status, body));
        self
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|r| r.path == path).count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.calls.lock().push(request.clone());

        let offset = request.param("o").map(str::to_string);
        let hit = self
            .routes
            .get(&(request.path.clone(), offset))
            .or_else(|| self.routes.get(&(request.path.clone(), None)));

        Ok(match hit {
            Some((status, body)) => ApiResponse::new(*status, body.clone()),
            None => ApiResponse::new(StatusCode::NOT_FOUND, Vec::new()),
        })
    }
}
